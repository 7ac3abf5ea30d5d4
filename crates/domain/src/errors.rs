//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// One or more validation rules failed; every violation is listed
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Invalid WhatsApp ID (phone number with country code)
    #[error("Invalid WhatsApp ID: {0}")]
    InvalidWhatsAppId(String),

    /// Media category outside image/video/document/audio
    #[error("Unsupported media category: {0}")]
    UnsupportedMedia(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Date/time parsing error
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create a validation error with a single violation
    pub fn validation(violation: impl Into<String>) -> Self {
        Self::Validation(vec![violation.into()])
    }

    /// Individual violations of a validation error (empty for other variants)
    #[must_use]
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Validation(violations) => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_creates_correct_error() {
        let err = DomainError::not_found("Message", "abc");
        match err {
            DomainError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "Message");
                assert_eq!(id, "abc");
            },
            _ => unreachable!("Expected NotFound error"),
        }
    }

    #[test]
    fn not_found_error_message_is_correct() {
        let err = DomainError::not_found("Chat", "491701234567");
        assert_eq!(err.to_string(), "Chat not found: 491701234567");
    }

    #[test]
    fn validation_error_lists_every_violation() {
        let err = DomainError::Validation(vec![
            "body text must not be empty".to_string(),
            "at most 3 buttons are allowed (got 4)".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: body text must not be empty; at most 3 buttons are allowed (got 4)"
        );
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn single_violation_helper() {
        let err = DomainError::validation("recipient is required");
        assert_eq!(err.violations(), ["recipient is required".to_string()]);
    }

    #[test]
    fn violations_empty_for_other_variants() {
        let err = DomainError::UnsupportedMedia("sticker".to_string());
        assert!(err.violations().is_empty());
        assert_eq!(err.to_string(), "Unsupported media category: sticker");
    }

    #[test]
    fn invalid_whatsapp_id_message() {
        let err = DomainError::InvalidWhatsAppId("abc".to_string());
        assert_eq!(err.to_string(), "Invalid WhatsApp ID: abc");
    }

    #[test]
    fn invalid_datetime_error_message() {
        let err = DomainError::InvalidDateTime("not a date".to_string());
        assert_eq!(err.to_string(), "Invalid date/time: not a date");
    }
}
