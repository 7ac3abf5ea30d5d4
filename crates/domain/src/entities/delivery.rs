//! Outcome of a send operation

use serde::{Deserialize, Serialize};

/// Whether the provider accepted a message for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// `true` when the provider accepted the message
    pub accepted: bool,
    /// Provider message (reason for rejection, info text)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DeliveryReceipt {
    /// Accepted receipt
    #[must_use]
    pub fn accepted(message: Option<String>) -> Self {
        Self {
            accepted: true,
            message,
        }
    }

    /// Rejected receipt
    #[must_use]
    pub fn rejected(message: Option<String>) -> Self {
        Self {
            accepted: false,
            message,
        }
    }
}
