//! Message service
//!
//! Listing, context windows and last-interaction lookups. Wati offers no
//! server-side filtering for messages, so date ranges, text queries and
//! offsets are applied here while paging through the chat history.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use domain::{Message, WhatsAppId, sort_chronological, sort_newest_first};
use tracing::{debug, info, instrument};

use crate::{
    error::ApplicationError,
    ports::WhatsAppGatewayPort,
    services::{
        chat_service::recent_chat_ids,
        paging::{PaginationPolicy, Step, walk_messages},
    },
};

/// Default number of messages returned by [`MessageService::list_messages`]
pub const DEFAULT_MESSAGE_LIMIT: u32 = 20;

/// Filter for [`MessageService::list_messages`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFilter {
    /// Chat to read
    pub chat: WhatsAppId,
    /// Only messages at or after this instant
    pub after: Option<DateTime<Utc>>,
    /// Only messages at or before this instant
    pub before: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the message text
    pub query: Option<String>,
    /// Maximum number of messages returned
    pub limit: u32,
    /// 0-based page of `limit` matching messages
    pub page: u32,
}

impl MessageFilter {
    /// Filter returning the latest [`DEFAULT_MESSAGE_LIMIT`] messages of a chat
    #[must_use]
    pub fn for_chat(chat: WhatsAppId) -> Self {
        Self {
            chat,
            after: None,
            before: None,
            query: None,
            limit: DEFAULT_MESSAGE_LIMIT,
            page: 0,
        }
    }

    /// Whether a message passes the client-side filters
    fn matches(&self, message: &Message) -> bool {
        if self.after.is_some() || self.before.is_some() {
            let Some(ts) = message.timestamp else {
                return false;
            };
            if self.after.is_some_and(|after| ts < after) || self.before.is_some_and(|b| ts > b) {
                return false;
            }
        }

        match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => message
                .body
                .text()
                .is_some_and(|text| text.to_lowercase().contains(&query.to_lowercase())),
        }
    }

    /// Whether the page proves that every following (older) page is before `after`
    fn passed_range(&self, newest_first: &[Message]) -> bool {
        match (self.after, newest_first.last().and_then(|m| m.timestamp)) {
            (Some(after), Some(oldest)) => oldest < after,
            _ => false,
        }
    }
}

/// Service for reading chat history
pub struct MessageService {
    gateway: Arc<dyn WhatsAppGatewayPort>,
    policy: PaginationPolicy,
}

impl fmt::Debug for MessageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl MessageService {
    /// Create a new message service
    pub fn new(gateway: Arc<dyn WhatsAppGatewayPort>, policy: PaginationPolicy) -> Self {
        Self { gateway, policy }
    }

    /// List messages of a chat, newest first
    ///
    /// Pages are requested until `(page + 1) * limit` matching messages have
    /// been seen or the provider runs out; never more calls than needed.
    #[instrument(skip(self, filter), fields(chat = %filter.chat, limit = filter.limit, page = filter.page))]
    pub async fn list_messages(
        &self,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, ApplicationError> {
        if filter.limit == 0 {
            return Ok(Vec::new());
        }

        let skip = filter.page.saturating_mul(filter.limit) as usize;
        let needed = skip + filter.limit as usize;
        let page_size = self
            .policy
            .page_size
            .min(u32::try_from(needed).unwrap_or(u32::MAX));

        let seen = walk_messages(
            self.gateway.as_ref(),
            &filter.chat,
            page_size,
            self.policy.max_pages,
            |messages| {
                let matching = messages.iter().filter(|m| filter.matches(m)).count();
                if matching >= needed || filter.passed_range(messages) {
                    Step::Stop
                } else {
                    Step::Continue
                }
            },
        )
        .await?;

        let mut matching: Vec<Message> = seen.into_iter().filter(|m| filter.matches(m)).collect();
        sort_newest_first(&mut matching);
        let result: Vec<Message> = matching
            .into_iter()
            .skip(skip)
            .take(filter.limit as usize)
            .collect();

        info!(count = result.len(), "Listed messages");
        Ok(result)
    }

    /// Contiguous slice of a chat around `message_id`, oldest first
    ///
    /// Contains up to `before` older and `after` newer messages plus the
    /// target itself. Without `chat` the most recent chats are searched.
    #[instrument(skip(self))]
    pub async fn get_message_context(
        &self,
        message_id: &str,
        before: usize,
        after: usize,
        chat: Option<&WhatsAppId>,
    ) -> Result<Vec<Message>, ApplicationError> {
        let message_id = message_id.trim();
        if message_id.is_empty() {
            return Err(ApplicationError::validation("message_id must not be empty"));
        }

        let candidates = match chat {
            Some(chat) => vec![chat.clone()],
            None => recent_chat_ids(self.gateway.as_ref(), self.policy.recent_chats_scan).await?,
        };

        for chat in &candidates {
            if let Some(window) = self.context_in_chat(chat, message_id, before, after).await? {
                info!(chat = %chat, size = window.len(), "Found message context");
                return Ok(window);
            }
        }

        Err(ApplicationError::not_found(format!("Message {message_id}")))
    }

    async fn context_in_chat(
        &self,
        chat: &WhatsAppId,
        message_id: &str,
        before: usize,
        after: usize,
    ) -> Result<Option<Vec<Message>>, ApplicationError> {
        let mut messages = walk_messages(
            self.gateway.as_ref(),
            chat,
            self.policy.page_size,
            self.policy.max_pages,
            |seen| match seen.iter().position(|m| m.id == message_id) {
                // Older messages follow the target in newest-first order
                Some(index) if seen.len() - index - 1 >= before => Step::Stop,
                _ => Step::Continue,
            },
        )
        .await?;

        sort_chronological(&mut messages);
        let Some(index) = messages.iter().position(|m| m.id == message_id) else {
            debug!(chat = %chat, "Message not in chat");
            return Ok(None);
        };

        let start = index.saturating_sub(before);
        let end = index.saturating_add(after).min(messages.len() - 1);
        Ok(Some(messages.drain(start..=end).collect()))
    }

    /// The most recent message exchanged with a contact
    #[instrument(skip(self), fields(contact = %contact))]
    pub async fn get_last_interaction(
        &self,
        contact: &WhatsAppId,
    ) -> Result<Message, ApplicationError> {
        let filter = MessageFilter {
            limit: 1,
            ..MessageFilter::for_chat(contact.clone())
        };
        self.list_messages(&filter)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApplicationError::not_found(format!("No messages with {contact}")))
    }
}
