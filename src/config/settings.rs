//! # Configuration Settings
//!
//! Defines the configuration structure for the Pokedex backend. Every section
//! has a `from_env()` constructor; `AppConfig::from_env()` pulls them all
//! together and is the single entry point used by `main`.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Authentication configuration
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables.
    ///
    /// Fails if `TOKEN_SECRET` is absent — the process must not start
    /// without an issuer secret.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        };
        config.validate_all()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_all(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.auth.validate_secret()?;

        if !self.database.url.starts_with("sqlite:") {
            return Err(Error::validation("Database URL must start with 'sqlite:'"));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 3001 }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create ServerConfig from environment variables
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port =
            std::env::var("PORT").ok().and_then(|s| s.parse::<u16>().ok()).unwrap_or(3001);
        Self { host, port }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Enable automatic migrations
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/pokedex.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    /// Create DatabaseConfig from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/pokedex.db".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);

        let connect_timeout_seconds = std::env::var("DATABASE_CONNECT_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let idle_timeout_seconds = std::env::var("DATABASE_IDLE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600);

        let auto_migrate = std::env::var("DATABASE_AUTO_MIGRATE")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(true);

        Self {
            url,
            max_connections,
            min_connections,
            connect_timeout_seconds,
            idle_timeout_seconds,
            auto_migrate,
        }
    }
}

/// Authentication configuration
///
/// The only secret this system carries is the token issuer secret. Tokens
/// embed it verbatim (see [`crate::auth::token`]), so the secret must never
/// contain the `:` delimiter — that would make every issued token unparseable.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AuthConfig {
    /// Issuer secret embedded in every bearer token
    #[validate(length(min = 1, message = "Token secret cannot be empty"))]
    pub token_secret: String,
}

impl AuthConfig {
    /// Create AuthConfig from the `TOKEN_SECRET` environment variable.
    ///
    /// Absence of the secret is fatal: callers propagate this error out of
    /// `main` before the server binds.
    pub fn from_env() -> Result<Self> {
        let token_secret = std::env::var("TOKEN_SECRET")
            .map_err(|_| Error::config("TOKEN_SECRET must be set"))?;

        let config = Self { token_secret };
        config.validate_secret()?;
        Ok(config)
    }

    /// Reject secrets the token wire format cannot carry
    pub fn validate_secret(&self) -> Result<()> {
        if self.token_secret.is_empty() {
            return Err(Error::config("TOKEN_SECRET must not be empty"));
        }
        if self.token_secret.contains(':') {
            return Err(Error::config(
                "TOKEN_SECRET must not contain ':' (reserved as the token field delimiter)",
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Tracing service name
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: false,
            service_name: "pokedex".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Create ObservabilityConfig from environment variables
    pub fn from_env() -> Self {
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let json_logging = std::env::var("LOG_JSON")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);
        let service_name =
            std::env::var("SERVICE_NAME").unwrap_or_else(|_| "pokedex".to_string());

        Self { log_level, json_logging, service_name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_rejects_empty_secret() {
        let config = AuthConfig { token_secret: String::new() };
        assert!(config.validate_secret().is_err());
    }

    #[test]
    fn auth_config_rejects_colon_in_secret() {
        let config = AuthConfig { token_secret: "s3:cr3t".to_string() };
        let err = config.validate_secret().unwrap_err();
        assert!(err.to_string().contains("delimiter"));
    }

    #[test]
    fn auth_config_accepts_plain_secret() {
        let config = AuthConfig { token_secret: "s3cr3t".to_string() };
        assert!(config.validate_secret().is_ok());
    }

    #[test]
    fn app_config_rejects_non_sqlite_url() {
        let config = AppConfig {
            auth: AuthConfig { token_secret: "s3cr3t".to_string() },
            database: DatabaseConfig {
                url: "postgresql://localhost/pokedex".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn server_config_bind_address() {
        let config = ServerConfig { host: "127.0.0.1".to_string(), port: 3001 };
        assert_eq!(config.bind_address(), "127.0.0.1:3001");
    }
}
