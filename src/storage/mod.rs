//! # Storage Layer
//!
//! SQLite connection pooling, embedded migrations, and the repository
//! implementations behind the auth and pokémon services.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, DbPool};
