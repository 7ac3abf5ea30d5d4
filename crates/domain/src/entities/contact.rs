//! Contact entity
//!
//! Snapshot of a Wati contact as returned by a single fetch. Never persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WhatsApp contact known to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// WhatsApp ID (usually identical to the phone number)
    pub id: String,
    /// Phone number as stored by the provider
    pub phone: String,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// First name, when the provider stores it separately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Account status (e.g. `VALID`, `INVALID`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last update timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Whether the contact opted in to business messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opted_in: Option<bool>,
    /// Whether broadcasts may be sent to the contact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_broadcast: Option<bool>,
    /// Where the contact was created (e.g. `WhatsApp`, `API`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Profile photo URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Provider-defined custom attributes
    #[serde(default)]
    pub custom_attributes: BTreeMap<String, String>,
}

impl Contact {
    /// Create a contact with only the identity fields set
    #[must_use]
    pub fn new(id: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phone: phone.into(),
            name: None,
            first_name: None,
            status: None,
            created: None,
            last_updated: None,
            opted_in: None,
            allow_broadcast: None,
            source: None,
            photo: None,
            custom_attributes: BTreeMap::new(),
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Best available label for the contact
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.first_name.as_deref())
            .unwrap_or(&self.phone)
    }

    /// Case-insensitive substring match against name, phone and ID
    ///
    /// An empty query matches every contact.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let name_matches = [self.name.as_deref(), self.first_name.as_deref()]
            .into_iter()
            .flatten()
            .any(|n| n.to_lowercase().contains(&needle));

        name_matches || self.phone.contains(&needle) || self.id.contains(&needle)
    }
}
