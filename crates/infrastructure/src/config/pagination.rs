//! Pagination limits for provider paging.

use application::PaginationPolicy;
use serde::{Deserialize, Serialize};

/// Provider paging configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationAppConfig {
    /// Messages requested per provider page (default: 20)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Maximum provider calls for one tool invocation (default: 50)
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Contacts requested per provider page (default: 100)
    #[serde(default = "default_contacts_page_size")]
    pub contacts_page_size: u32,

    /// Chats scanned by `get_message_context` without a chat (default: 5)
    #[serde(default = "default_recent_chats_scan")]
    pub recent_chats_scan: u32,
}

const fn default_page_size() -> u32 {
    20
}

const fn default_max_pages() -> u32 {
    50
}

const fn default_contacts_page_size() -> u32 {
    100
}

const fn default_recent_chats_scan() -> u32 {
    5
}

impl Default for PaginationAppConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            contacts_page_size: default_contacts_page_size(),
            recent_chats_scan: default_recent_chats_scan(),
        }
    }
}

impl PaginationAppConfig {
    /// Names of limits set to zero
    pub(super) fn zero_limits(&self) -> Vec<&'static str> {
        [
            ("pagination.page_size", self.page_size),
            ("pagination.max_pages", self.max_pages),
            ("pagination.contacts_page_size", self.contacts_page_size),
            ("pagination.recent_chats_scan", self.recent_chats_scan),
        ]
        .into_iter()
        .filter(|(_, value)| *value == 0)
        .map(|(name, _)| name)
        .collect()
    }
}

impl From<PaginationAppConfig> for PaginationPolicy {
    fn from(config: PaginationAppConfig) -> Self {
        Self {
            page_size: config.page_size,
            max_pages: config.max_pages,
            contacts_page_size: config.contacts_page_size,
            recent_chats_scan: config.recent_chats_scan,
        }
    }
}
