//! Wati client configuration

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::WatiError;

/// Immutable connection settings for the Wati API
///
/// Built once at startup and handed to [`crate::WatiClient::new`].
#[derive(Clone)]
pub struct WatiClientConfig {
    /// API base URL (e.g. `https://live-mt-server.wati.io`)
    pub base_url: String,
    /// Tenant identifier, appended as the first path segment
    pub tenant_id: String,
    /// Bearer token
    pub auth_token: SecretString,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl fmt::Debug for WatiClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatiClientConfig")
            .field("base_url", &self.base_url)
            .field("tenant_id", &self.tenant_id)
            .field("auth_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

impl WatiClientConfig {
    /// Create a configuration with the default timeout
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        tenant_id: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            tenant_id: tenant_id.into(),
            auth_token: SecretString::from(auth_token.into()),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Create a configuration for testing against a mock server
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            timeout_secs: 5,
            ..Self::new(base_url, "123456", "test-token")
        }
    }

    /// Tenant API root: `<base_url>/<tenant_id>`
    #[must_use]
    pub fn api_root(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.tenant_id.trim_matches('/')
        )
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`WatiError::Configuration`] if a required value is missing.
    pub fn validate(&self) -> Result<(), WatiError> {
        if self.base_url.trim().is_empty() {
            return Err(WatiError::Configuration("base_url is required".to_string()));
        }
        if self.tenant_id.trim().is_empty() {
            return Err(WatiError::Configuration("tenant_id is required".to_string()));
        }
        if self.auth_token.expose_secret().trim().is_empty() {
            return Err(WatiError::Configuration("auth_token is required".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(WatiError::Configuration(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
