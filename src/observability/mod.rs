//! # Observability
//!
//! Structured logging via the tracing ecosystem. The subscriber honors
//! `RUST_LOG` when set, falling back to the configured log level, and can
//! emit JSON for log shippers.

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
        return Ok(());
    }

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = config.json_logging,
        "Observability initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        let config = ObservabilityConfig::default();
        assert!(init_tracing(&config).is_ok());
        // Second call hits the already-installed subscriber path.
        assert!(init_tracing(&config).is_ok());
    }
}
