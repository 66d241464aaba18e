//! # API Routing
//!
//! Assembles the public and token-protected route trees. Protected routes
//! sit behind the [`authenticate`] middleware; admin-only routes carry an
//! additional [`require_admin`] route layer that runs after it.

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::Any, cors::CorsLayer, trace::TraceLayer};

use crate::api::docs;
use crate::api::handlers::auth::{
    me_handler, refresh_handler, sign_in_handler, sign_out_handler, sign_up_handler,
    verify_admin_handler,
};
use crate::api::handlers::health::health_handler;
use crate::api::handlers::pokemon::{
    create_pokemon_handler, delete_pokemon_handler, get_pokemon_handler, list_pokemons_handler,
    update_pokemon_handler,
};
use crate::auth::middleware::{authenticate, require_admin};
use crate::auth::session::SessionService;
use crate::storage::repositories::PokemonRepository;

#[derive(Clone)]
pub struct ApiState {
    pub session: SessionService,
    pub pokemons: Arc<dyn PokemonRepository>,
}

pub fn build_router(state: ApiState) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.session.clone(), authenticate);
    let admin_layer = middleware::from_fn(require_admin);

    let public = Router::new()
        .route("/health", get(health_handler))
        .route("/auth/signup", post(sign_up_handler))
        .route("/auth/signin", post(sign_in_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route("/pokemons", get(list_pokemons_handler))
        .route("/pokemons/{id}", get(get_pokemon_handler));

    let protected = Router::new()
        .route("/auth/signout", post(sign_out_handler))
        .route("/auth/me", get(me_handler))
        .route("/pokemons", post(create_pokemon_handler))
        .route(
            "/pokemons/{id}",
            put(update_pokemon_handler).delete(delete_pokemon_handler),
        )
        .merge(
            Router::new()
                .route("/auth/verify-admin", post(verify_admin_handler))
                .route_layer(admin_layer),
        )
        .route_layer(auth_layer);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api = Router::new().merge(public).merge(protected).with_state(state);

    api.merge(docs::docs_router()).layer(cors).layer(TraceLayer::new_for_http())
}
