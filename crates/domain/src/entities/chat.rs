//! Chat entity
//!
//! Wati only has 1:1 chats, so a chat is a projection of one contact plus
//! that contact's message history.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{contact::Contact, message::Message};

/// Denormalized contact reference carried by a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRef {
    /// WhatsApp ID
    pub id: String,
    /// Phone number
    pub phone: String,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&Contact> for ContactRef {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id.clone(),
            phone: contact.phone.clone(),
            name: contact.name.clone().or_else(|| contact.first_name.clone()),
        }
    }
}

/// A 1:1 chat with a contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Chat identifier (the contact's WhatsApp ID)
    pub id: String,
    /// Chat title (contact name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact on the other side
    pub contact: ContactRef,
    /// Timestamp of the most recent message, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    /// Most recent message, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
}

impl Chat {
    /// Project a chat from a contact
    #[must_use]
    pub fn from_contact(contact: &Contact) -> Self {
        let contact_ref = ContactRef::from(contact);
        Self {
            id: contact.id.clone(),
            name: contact_ref.name.clone(),
            contact: contact_ref,
            last_activity: None,
            last_message: None,
        }
    }

    /// Attach the most recent message and derive the last activity from it
    #[must_use]
    pub fn with_last_message(mut self, message: Option<Message>) -> Self {
        self.last_activity = message.as_ref().and_then(|m| m.timestamp);
        self.last_message = message;
        self
    }

    /// Case-insensitive substring match against name and ID
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self.id.contains(&needle)
            || self.contact.phone.contains(&needle)
            || self
                .name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
    }
}

/// Sort order for chat listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSort {
    /// Most recently active first; chats without activity last
    #[default]
    LastActive,
    /// Alphabetical by name (case-insensitive), unnamed chats last
    Name,
}

impl ChatSort {
    /// Compare two chats under this ordering; ties fall back to chat ID
    #[must_use]
    pub fn compare(self, a: &Chat, b: &Chat) -> Ordering {
        let primary = match self {
            Self::LastActive => b.last_activity.cmp(&a.last_activity),
            Self::Name => match (&a.name, &b.name) {
                (Some(x), Some(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl std::str::FromStr for ChatSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "last_active" | "" => Ok(Self::LastActive),
            "name" => Ok(Self::Name),
            other => Err(format!(
                "Invalid sort_by: {other}. Use 'last_active' or 'name'"
            )),
        }
    }
}
