//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, an optional TOML file,
//! then `WATI_`-prefixed environment variables (nested keys use `__`, e.g.
//! `WATI_MEDIA__SCRATCH_DIR`). Split into sub-modules by concern:
//! - `pagination`: provider paging limits
//! - `media`: download scratch directory
//! - `logging`: log level and format

mod logging;
mod media;
mod pagination;

use std::{collections::HashMap, fmt, path::Path};

use integration_wati::WatiClientConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use logging::LoggingAppConfig;
pub use media::MediaAppConfig;
pub use pagination::PaginationAppConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "WATI";

/// Configuration file looked up in the working directory (any supported extension)
pub const DEFAULT_CONFIG_FILE: &str = "wati-mcp";

/// Configuration loading or validation failure
#[derive(Debug, Error)]
pub enum AppConfigError {
    /// Sources could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values are present but unusable
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Main application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Wati API base URL (e.g. `https://live-mt-server.wati.io`)
    #[serde(default)]
    pub api_base_url: String,

    /// Wati tenant identifier
    #[serde(default)]
    pub tenant_id: String,

    /// Wati bearer token (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub auth_token: Option<SecretString>,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Paging limits
    #[serde(default)]
    pub pagination: PaginationAppConfig,

    /// Media settings
    #[serde(default)]
    pub media: MediaAppConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingAppConfig,
}

const fn default_timeout_secs() -> u64 {
    30
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("tenant_id", &self.tenant_id)
            .field(
                "auth_token",
                &if self.auth_token.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("timeout_secs", &self.timeout_secs)
            .field("pagination", &self.pagination)
            .field("media", &self.media)
            .field("logging", &self.logging)
            .finish()
    }
}

impl AppConfig {
    /// Load and validate configuration from `.env`, the config file and the environment
    ///
    /// `path` replaces the default `wati-mcp.*` lookup and must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, AppConfigError> {
        // A missing .env file is the common case
        let _ = dotenvy::dotenv();
        Self::load_from(path, None)
    }

    /// Load and validate configuration, reading variables from `env` instead
    /// of the process environment when given
    pub fn load_from(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, AppConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Check that credentials are present and limits are usable
    ///
    /// Reports every problem at once.
    pub fn validate(&self) -> Result<(), AppConfigError> {
        let mut problems = Vec::new();

        if self.api_base_url.trim().is_empty() {
            problems.push(format!("api_base_url is required ({ENV_PREFIX}_API_BASE_URL)"));
        } else if !is_http_url(&self.api_base_url) {
            problems.push(format!(
                "api_base_url '{}' is not an http(s) URL",
                self.api_base_url
            ));
        }

        if self.tenant_id.trim().is_empty() {
            problems.push(format!("tenant_id is required ({ENV_PREFIX}_TENANT_ID)"));
        }

        if self
            .auth_token
            .as_ref()
            .is_none_or(|t| t.expose_secret().trim().is_empty())
        {
            problems.push(format!("auth_token is required ({ENV_PREFIX}_AUTH_TOKEN)"));
        }

        if self.timeout_secs == 0 {
            problems.push("timeout_secs must be greater than 0".to_string());
        }

        problems.extend(
            self.pagination
                .zero_limits()
                .into_iter()
                .map(|name| format!("{name} must be greater than 0")),
        );

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppConfigError::Invalid(problems))
        }
    }

    /// Immutable client settings derived from this configuration
    #[must_use]
    pub fn wati_client_config(&self) -> WatiClientConfig {
        WatiClientConfig {
            base_url: self.api_base_url.trim().to_string(),
            tenant_id: self.tenant_id.trim().to_string(),
            auth_token: self
                .auth_token
                .clone()
                .unwrap_or_else(|| SecretString::from(String::new())),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Configuration pointing at a mock server, for tests
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            tenant_id: "123456".to_string(),
            auth_token: Some(SecretString::from("test-token".to_string())),
            timeout_secs: 5,
            pagination: PaginationAppConfig::default(),
            media: MediaAppConfig::default(),
            logging: LoggingAppConfig::default(),
        }
    }
}

fn is_http_url(value: &str) -> bool {
    reqwest::Url::parse(value.trim())
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}
