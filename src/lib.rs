//! # Pokedex Backend
//!
//! A small REST backend for a Pokédex application: account sign-up and
//! sign-in with bearer tokens, refresh token rotation, an admin role gate,
//! and CRUD over Pokédex entries. Built on axum with SQLite persistence.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;

pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "pokedex";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "pokedex");
    }
}
