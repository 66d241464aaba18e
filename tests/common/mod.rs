//! Common test utilities for all integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use pokedex::api::ApiState;
use pokedex::auth::{SessionService, TokenCodec};
use pokedex::config::DatabaseConfig;
use pokedex::storage::repositories::SqlxPokemonRepository;
use pokedex::storage::{create_pool, DbPool};

pub const TEST_SECRET: &str = "test-secret";

/// Create a migrated in-memory SQLite pool.
///
/// A single connection is required: each in-memory connection is its own
/// database, so the pool must never open a second one.
pub async fn memory_pool() -> DbPool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        idle_timeout_seconds: 0,
        auto_migrate: true,
        ..Default::default()
    };

    create_pool(&config).await.expect("create in-memory pool")
}

pub fn test_codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET)
}

pub async fn session_service(pool: DbPool) -> SessionService {
    SessionService::with_sqlx(pool, test_codec())
}

pub async fn api_state(pool: DbPool) -> ApiState {
    ApiState {
        session: session_service(pool.clone()).await,
        pokemons: Arc::new(SqlxPokemonRepository::new(pool)),
    }
}
