//! OpenAPI document and Swagger UI wiring.

use axum::Router;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_handler,
        crate::api::handlers::auth::sign_up_handler,
        crate::api::handlers::auth::sign_in_handler,
        crate::api::handlers::auth::refresh_handler,
        crate::api::handlers::auth::sign_out_handler,
        crate::api::handlers::auth::me_handler,
        crate::api::handlers::auth::verify_admin_handler,
        crate::api::handlers::pokemon::create_pokemon_handler,
        crate::api::handlers::pokemon::list_pokemons_handler,
        crate::api::handlers::pokemon::get_pokemon_handler,
        crate::api::handlers::pokemon::update_pokemon_handler,
        crate::api::handlers::pokemon::delete_pokemon_handler
    ),
    components(
        schemas(
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::auth::SignUpBody,
            crate::api::handlers::auth::SignInBody,
            crate::api::handlers::auth::RefreshBody,
            crate::api::handlers::auth::MessageResponse,
            crate::domain::ProfileId,
            crate::auth::models::PublicProfile,
            crate::auth::models::Role,
            crate::auth::models::Permission,
            crate::auth::models::SessionTokens,
            crate::auth::models::SignInResponse,
            crate::storage::repositories::Pokemon,
            crate::storage::repositories::PokemonPatch,
            crate::storage::repositories::Evolution
        )
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "auth", description = "Account and session management"),
        (name = "pokemons", description = "Pokédex entry management")
    ),
    security(
        ("bearerAuth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

pub fn docs_router() -> Router {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()).into()
}
