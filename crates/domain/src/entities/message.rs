//! Message entity and its deterministic ordering

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::media::MediaReference;

/// Who sent a message, seen from the business account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Sent by the contact
    Inbound,
    /// Sent by the business (operator, bot or API)
    Outbound,
}

/// Delivery state reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Queued, not yet sent
    Pending,
    /// Sent to WhatsApp
    Sent,
    /// Delivered to the device
    Delivered,
    /// Read by the recipient
    Read,
    /// Delivery failed
    Failed,
    /// Status missing or not recognized
    #[default]
    Unknown,
}

impl DeliveryStatus {
    /// Parse a provider status string (case-insensitive)
    #[must_use]
    pub fn from_provider(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" => Self::Pending,
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            "read" | "seen" => Self::Read,
            "failed" | "error" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    /// Plain text
    Text {
        /// Message text
        text: String,
    },
    /// Media attachment with optional caption
    Media {
        /// Remote media reference
        media: MediaReference,
        /// Caption text
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Any other provider message type (location, template, button reply, ...)
    Other {
        /// Provider message type
        message_type: String,
        /// Text representation, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl MessageBody {
    /// Text content regardless of body kind (caption for media)
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Media { caption, .. } => caption.as_deref(),
            Self::Other { text, .. } => text.as_deref(),
        }
    }
}

/// A message in a 1:1 chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Provider-assigned message ID
    pub id: String,
    /// Chat (WhatsApp ID of the contact) the message belongs to
    pub chat_id: String,
    /// Inbound or outbound
    pub direction: Direction,
    /// Sender label (contact WAID for inbound, operator name for outbound)
    pub sender: String,
    /// Creation time; `None` when the provider sent no parseable timestamp
    pub timestamp: Option<DateTime<Utc>>,
    /// Content
    pub body: MessageBody,
    /// Delivery status
    #[serde(default)]
    pub status: DeliveryStatus,
}

impl Message {
    /// Create an inbound text message
    #[must_use]
    pub fn text(
        id: impl Into<String>,
        chat_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        text: impl Into<String>,
    ) -> Self {
        let chat_id = chat_id.into();
        Self {
            id: id.into(),
            sender: chat_id.clone(),
            chat_id,
            direction: Direction::Inbound,
            timestamp: Some(timestamp),
            body: MessageBody::Text { text: text.into() },
            status: DeliveryStatus::Unknown,
        }
    }

    /// Whether the business account sent this message
    #[must_use]
    pub fn is_outbound(&self) -> bool {
        self.direction == Direction::Outbound
    }

    /// Media reference, if this is a media message
    #[must_use]
    pub fn media(&self) -> Option<&MediaReference> {
        match &self.body {
            MessageBody::Media { media, .. } => Some(media),
            _ => None,
        }
    }

    /// Oldest-first order: timestamp ascending, ties broken by ID ascending
    #[must_use]
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Newest-first order: timestamp descending, ties broken by ID ascending
    #[must_use]
    pub fn newest_first_cmp(&self, other: &Self) -> Ordering {
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// One-line human readable rendering
    ///
    /// `[2024-05-01 09:30:00] From: Me: [image - Message ID: m1 - Chat WAID: 49..] caption`
    #[must_use]
    pub fn summary_line(&self) -> String {
        let when = self.timestamp.map_or_else(
            || "unknown time".to_string(),
            |ts| ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        let sender = if self.is_outbound() {
            "Me"
        } else {
            self.sender.as_str()
        };
        let prefix = match &self.body {
            MessageBody::Media { media, .. } => format!(
                "[{} - Message ID: {} - Chat WAID: {}] ",
                media.category, self.id, self.chat_id
            ),
            MessageBody::Other { message_type, .. } => format!(
                "[{message_type} - Message ID: {} - Chat WAID: {}] ",
                self.id, self.chat_id
            ),
            MessageBody::Text { .. } => String::new(),
        };
        format!(
            "[{when}] From: {sender}: {prefix}{}",
            self.body.text().unwrap_or_default()
        )
    }
}

/// Sort messages oldest first (deterministic on equal timestamps)
pub fn sort_chronological(messages: &mut [Message]) {
    messages.sort_by(Message::chronological_cmp);
}

/// Sort messages newest first (deterministic on equal timestamps)
pub fn sort_newest_first(messages: &mut [Message]) {
    messages.sort_by(Message::newest_first_cmp);
}
