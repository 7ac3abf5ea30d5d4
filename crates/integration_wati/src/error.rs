//! Wati client error types

use thiserror::Error;

/// Errors that can occur while talking to the Wati API
#[derive(Debug, Error)]
pub enum WatiError {
    /// Credentials rejected (HTTP 401/403)
    #[error("Authentication failed (HTTP {status}): {message}")]
    AuthenticationFailed {
        /// HTTP status code
        status: u16,
        /// Provider message
        message: String,
    },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by the API)
        retry_after_secs: Option<u64>,
    },

    /// Any other non-2xx response
    #[error("Wati API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider message or raw body
        message: String,
    },

    /// Connection to the API could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request failed before a response arrived
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Response could not be interpreted
    #[error("Unexpected response: {0}")]
    Schema(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller-supplied argument the client cannot act on
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local file system error while storing or reading media
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatiError {
    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::RequestFailed(_)
                | Self::Timeout { .. }
                | Self::RateLimitExceeded { .. }
        )
    }

    /// Returns true if the provider reported the resource as missing
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Map a reqwest transport failure
    pub(crate) fn from_transport(error: &reqwest::Error, timeout_secs: u64) -> Self {
        if error.is_timeout() {
            Self::Timeout { timeout_secs }
        } else if error.is_connect() {
            Self::ConnectionFailed(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}
