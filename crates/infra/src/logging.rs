//! Logging initialisation
//!
//! `RUST_LOG` wins over the configured level when set.

use pgsafe_domain::{LoggingConfig, PgSafeError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// # Errors
/// Returns `PgSafeError::Config` when the configured level is not a valid
/// filter directive, or when a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| PgSafeError::Config(format!("Failed to initialise logging: {e}")))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            PgSafeError::Config(format!("Invalid log level `{}`: {e}", config.level))
        }),
    }
}
