//! Pokédex CRUD endpoints. Reads are public; mutations sit behind the
//! bearer token middleware.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use crate::api::error::ApiError;
use crate::api::handlers::auth::MessageResponse;
use crate::api::routes::ApiState;
use crate::storage::repositories::{Pokemon, PokemonPatch};

fn validate_entry(pokemon: &Pokemon) -> Result<(), ApiError> {
    if pokemon.id <= 0 {
        return Err(ApiError::bad_request("Pokemon id must be positive"));
    }
    if pokemon.num.is_empty() || pokemon.name.is_empty() {
        return Err(ApiError::bad_request("Pokemon num and name are required"));
    }
    if pokemon.types.is_empty() {
        return Err(ApiError::bad_request("Pokemon must have at least one type"));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/pokemons",
    request_body = Pokemon,
    responses(
        (status = 201, description = "Pokemon created", body = Pokemon),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Pokemon id already exists")
    ),
    security(("bearerAuth" = [])),
    tag = "pokemons"
)]
pub async fn create_pokemon_handler(
    State(state): State<ApiState>,
    Json(payload): Json<Pokemon>,
) -> Result<(StatusCode, Json<Pokemon>), ApiError> {
    validate_entry(&payload)?;

    let created = state.pokemons.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/pokemons",
    responses(
        (status = 200, description = "All pokemons ordered by id", body = [Pokemon])
    ),
    tag = "pokemons"
)]
pub async fn list_pokemons_handler(
    State(state): State<ApiState>,
) -> Result<Json<Vec<Pokemon>>, ApiError> {
    let pokemons = state.pokemons.list().await?;
    Ok(Json(pokemons))
}

#[utoipa::path(
    get,
    path = "/pokemons/{id}",
    params(("id" = i64, Path, description = "Pokédex id")),
    responses(
        (status = 200, description = "Pokemon details", body = Pokemon),
        (status = 404, description = "Pokemon not found")
    ),
    tag = "pokemons"
)]
pub async fn get_pokemon_handler(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<Pokemon>, ApiError> {
    let pokemon = state
        .pokemons
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Pokemon '{}' not found", id)))?;
    Ok(Json(pokemon))
}

#[utoipa::path(
    put,
    path = "/pokemons/{id}",
    params(("id" = i64, Path, description = "Pokédex id")),
    request_body = PokemonPatch,
    responses(
        (status = 200, description = "Pokemon updated", body = Pokemon),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Pokemon not found")
    ),
    security(("bearerAuth" = [])),
    tag = "pokemons"
)]
pub async fn update_pokemon_handler(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(payload): Json<PokemonPatch>,
) -> Result<Json<Pokemon>, ApiError> {
    if payload.types.as_ref().is_some_and(Vec::is_empty) {
        return Err(ApiError::bad_request("Pokemon must have at least one type"));
    }

    let updated = state.pokemons.update(id, payload).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/pokemons/{id}",
    params(("id" = i64, Path, description = "Pokédex id")),
    responses(
        (status = 200, description = "Pokemon deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Pokemon not found")
    ),
    security(("bearerAuth" = [])),
    tag = "pokemons"
)]
pub async fn delete_pokemon_handler(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.pokemons.delete(id).await?;
    Ok(Json(MessageResponse { message: format!("Pokemon {} deleted", id) }))
}
