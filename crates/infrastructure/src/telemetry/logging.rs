//! `tracing-subscriber` initialization

use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingAppConfig;

/// Filter directive for the configured level and CLI verbosity
///
/// Each `-v` raises the level one step (`debug`, then `trace`) for every
/// target; without `-v` the configured level or directive is used as is.
#[must_use]
pub fn filter_directive(level: &str, verbosity: u8) -> String {
    match verbosity {
        0 if level.trim().is_empty() => "info".to_string(),
        0 => level.trim().to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber writing to stderr
///
/// `RUST_LOG` takes precedence over the configuration when set.
pub fn init_logging(config: &LoggingAppConfig, verbosity: u8) -> Result<(), TelemetryError> {
    let directive = filter_directive(&config.level, verbosity);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .map_err(|e| TelemetryError::Filter(format!("'{directive}': {e}")))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(true),
            )
            .try_init()
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    debug!(json = config.json, directive = %directive, "Logging initialized");
    Ok(())
}

/// Error type for logging initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to install the tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),

    /// Invalid filter directive
    #[error("Invalid log filter {0}")]
    Filter(String),
}
