use std::sync::Arc;

use pokedex::{
    api::{start_api_server, ApiState},
    auth::{SessionService, TokenCodec},
    config::ObservabilityConfig,
    observability::init_tracing,
    storage::{create_pool, repositories::SqlxPokemonRepository},
    AppConfig, Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before any config is read from environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let observability_config = ObservabilityConfig::from_env();
    init_tracing(&observability_config)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting Pokedex API");

    let config = AppConfig::from_env()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        database_url = %config.database.url,
        "Configuration loaded"
    );

    let pool = create_pool(&config.database).await?;

    let codec = TokenCodec::new(config.auth.token_secret.clone());
    let state = ApiState {
        session: SessionService::with_sqlx(pool.clone(), codec),
        pokemons: Arc::new(SqlxPokemonRepository::new(pool)),
    };

    start_api_server(config.server, state).await
}
