//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingAppConfig {
    /// Level or filter directive used when `RUST_LOG` is unset (default: info)
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingAppConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
