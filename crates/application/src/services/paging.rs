//! Pagination limits and the shared page walker

use std::collections::HashSet;

use domain::{Message, PageRequest, WhatsAppId};
use tracing::{debug, warn};

use crate::{error::ApplicationError, ports::WhatsAppGatewayPort};

/// Limits applied when walking provider pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    /// Messages requested per provider page
    pub page_size: u32,
    /// Upper bound on provider calls for a single operation
    pub max_pages: u32,
    /// Contacts requested per provider page
    pub contacts_page_size: u32,
    /// Chats scanned when a message is looked up without a chat
    pub recent_chats_scan: u32,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_pages: 50,
            contacts_page_size: 100,
            recent_chats_scan: 5,
        }
    }
}

/// What the walker should do after a page
pub(crate) enum Step {
    /// Fetch the next page
    Continue,
    /// Stop walking
    Stop,
}

/// Walk a chat's message pages (newest first) until `visit` says stop, the
/// provider runs out of messages or `max_pages` is reached
///
/// Messages already seen on an earlier page are dropped, so a history that
/// shifts while paging never yields duplicates. Returns every message seen
/// in provider order.
pub(crate) async fn walk_messages<F>(
    gateway: &dyn WhatsAppGatewayPort,
    chat: &WhatsAppId,
    page_size: u32,
    max_pages: u32,
    mut visit: F,
) -> Result<Vec<Message>, ApplicationError>
where
    F: FnMut(&[Message]) -> Step + Send,
{
    let mut request = PageRequest::first(page_size.max(1));
    let mut seen = HashSet::new();
    let mut collected = Vec::new();

    for _ in 0..max_pages {
        let page = gateway.fetch_messages(chat, request).await?;
        let has_more = page.has_more_after(request);

        let fresh: Vec<Message> = page
            .items
            .into_iter()
            .filter(|m| seen.insert(m.id.clone()))
            .collect();
        debug!(
            page = request.page_number,
            received = fresh.len(),
            "Fetched message page"
        );
        collected.extend(fresh);

        if matches!(visit(&collected), Step::Stop) || !has_more {
            return Ok(collected);
        }
        request = request.next();
    }

    warn!(chat = %chat, max_pages, "Stopped paging at max_pages");
    Ok(collected)
}
