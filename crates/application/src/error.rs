//! Application-level errors

use std::{fmt, path::PathBuf};

use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error (validation, unsupported media, ...)
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Credentials rejected by the provider
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying (if provided)
        retry_after_secs: Option<u64>,
    },

    /// Expected absence (no messages yet, unknown chat, ...)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected provider error response
    #[error("Remote service error: {0}")]
    Remote(String),

    /// Network failure or timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider returned data that cannot be interpreted
    #[error("Unexpected provider response: {0}")]
    Schema(String),

    /// Local file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable error classification reported to tool callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed caller input, rejected before any I/O
    ValidationError,
    /// Bad or expired credentials
    AuthError,
    /// Provider rate limit hit
    RateLimitError,
    /// Expected absence
    NotFound,
    /// Unexpected non-2xx response
    RemoteError,
    /// Network failure or timeout
    TransportError,
    /// Uninterpretable provider data
    SchemaError,
    /// Local file missing
    FileNotFound,
    /// Media category outside image/video/document/audio
    UnsupportedMedia,
    /// Anything else
    InternalError,
}

impl ErrorKind {
    /// Snake case identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::AuthError => "auth_error",
            Self::RateLimitError => "rate_limit_error",
            Self::NotFound => "not_found",
            Self::RemoteError => "remote_error",
            Self::TransportError => "transport_error",
            Self::SchemaError => "schema_error",
            Self::FileNotFound => "file_not_found",
            Self::UnsupportedMedia => "unsupported_media",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApplicationError {
    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a validation error with a single violation
    pub fn validation(violation: impl Into<String>) -> Self {
        Self::Domain(DomainError::validation(violation))
    }

    /// Classify the error for tool callers
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(DomainError::UnsupportedMedia(_)) => ErrorKind::UnsupportedMedia,
            Self::Domain(DomainError::NotFound { .. }) | Self::NotFound(_) => ErrorKind::NotFound,
            Self::Domain(_) => ErrorKind::ValidationError,
            Self::Authentication(_) => ErrorKind::AuthError,
            Self::RateLimited { .. } => ErrorKind::RateLimitError,
            Self::Remote(_) => ErrorKind::RemoteError,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::Schema(_) => ErrorKind::SchemaError,
            Self::FileNotFound(_) => ErrorKind::FileNotFound,
            Self::Configuration(_) | Self::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Retry hint in seconds, for rate limit errors
    #[must_use]
    pub const fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            ApplicationError::validation("bad").kind(),
            ErrorKind::ValidationError
        );
        assert_eq!(
            ApplicationError::Domain(DomainError::UnsupportedMedia("gif".into())).kind(),
            ErrorKind::UnsupportedMedia
        );
        assert_eq!(
            ApplicationError::Domain(DomainError::InvalidWhatsAppId("x".into())).kind(),
            ErrorKind::ValidationError
        );
        assert_eq!(ApplicationError::not_found("chat").kind(), ErrorKind::NotFound);
        assert_eq!(
            ApplicationError::Authentication("401".into()).kind(),
            ErrorKind::AuthError
        );
        assert_eq!(
            ApplicationError::FileNotFound(PathBuf::from("/nope")).kind(),
            ErrorKind::FileNotFound
        );
        assert_eq!(ApplicationError::Schema("x".into()).kind(), ErrorKind::SchemaError);
    }

    #[test]
    fn kind_strings() {
        assert_eq!(ErrorKind::RateLimitError.as_str(), "rate_limit_error");
        assert_eq!(
            serde_json::to_value(ErrorKind::UnsupportedMedia).unwrap(),
            "unsupported_media"
        );
        assert_eq!(ErrorKind::TransportError.to_string(), "transport_error");
    }

    #[test]
    fn retry_hint_only_for_rate_limits() {
        let err = ApplicationError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert_eq!(err.retry_after_secs(), Some(30));
        assert!(err.is_retryable());
        assert_eq!(ApplicationError::Remote("x".into()).retry_after_secs(), None);
        assert!(!ApplicationError::Remote("x".into()).is_retryable());
    }

    #[test]
    fn file_not_found_message_has_path() {
        let err = ApplicationError::FileNotFound(PathBuf::from("/tmp/missing.pdf"));
        assert_eq!(err.to_string(), "File not found: /tmp/missing.pdf");
    }
}
