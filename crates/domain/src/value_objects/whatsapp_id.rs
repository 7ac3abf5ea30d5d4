//! WhatsApp ID value object
//!
//! Wati addresses contacts and chats by their WhatsApp ID (WAID): the phone
//! number with country code, digits only, no leading `+`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A validated WhatsApp ID (e.g., `491701234567`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WhatsAppId {
    value: String,
}

impl WhatsAppId {
    /// Create a new WhatsApp ID, normalizing common phone number formatting
    ///
    /// Accepts `+49 170 1234567`, `49-170-1234567` or `491701234567` and
    /// stores the digits only. Length: 7-15 digits (E.164 bounds).
    pub fn new(number: impl Into<String>) -> Result<Self, DomainError> {
        let raw = number.into();
        let value = raw
            .trim()
            .trim_start_matches('+')
            .replace([' ', '-', '(', ')'], "");

        if value.is_empty() {
            return Err(DomainError::InvalidWhatsAppId(
                "WhatsApp ID must not be empty".to_string(),
            ));
        }

        if !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidWhatsAppId(format!(
                "'{raw}' must contain only digits"
            )));
        }

        if value.len() < 7 || value.len() > 15 {
            return Err(DomainError::InvalidWhatsAppId(format!(
                "'{raw}' must have 7-15 digits"
            )));
        }

        Ok(Self { value })
    }

    /// Get the WhatsApp ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for WhatsAppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl AsRef<str> for WhatsAppId {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl TryFrom<String> for WhatsAppId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for WhatsAppId {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WhatsAppId> for String {
    fn from(id: WhatsAppId) -> Self {
        id.value
    }
}
