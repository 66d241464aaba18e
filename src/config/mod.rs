//! # Configuration
//!
//! Application configuration loaded from environment variables.

mod settings;

pub use settings::{AppConfig, AuthConfig, DatabaseConfig, ObservabilityConfig, ServerConfig};
