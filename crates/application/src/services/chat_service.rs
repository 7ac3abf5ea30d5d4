//! Chat service - chat listings and lookups
//!
//! Wati has no chat resource; chats are projected from contacts and enriched
//! with the newest message of each contact when requested.

use std::{fmt, sync::Arc};

use domain::{Chat, ChatSort, Contact, Message, PageRequest, WhatsAppId};
use tracing::{debug, info, instrument, warn};

use crate::{error::ApplicationError, ports::WhatsAppGatewayPort, services::PaginationPolicy};

/// Filter for [`ChatService::list_chats`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatFilter {
    /// Case-insensitive substring of the chat name or ID
    pub query: Option<String>,
    /// Chats per page
    pub limit: u32,
    /// 0-based page
    pub page: u32,
    /// Attach each chat's newest message
    pub include_last_message: bool,
    /// Result ordering
    pub sort_by: ChatSort,
}

impl Default for ChatFilter {
    fn default() -> Self {
        Self {
            query: None,
            limit: 20,
            page: 0,
            include_last_message: true,
            sort_by: ChatSort::LastActive,
        }
    }
}

/// Service for chat projections
pub struct ChatService {
    gateway: Arc<dyn WhatsAppGatewayPort>,
    policy: PaginationPolicy,
}

impl fmt::Debug for ChatService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ChatService {
    /// Create a new chat service
    pub fn new(gateway: Arc<dyn WhatsAppGatewayPort>, policy: PaginationPolicy) -> Self {
        Self { gateway, policy }
    }

    /// List chats, one provider contact page per call
    #[instrument(skip(self, filter), fields(limit = filter.limit, page = filter.page))]
    pub async fn list_chats(&self, filter: &ChatFilter) -> Result<Vec<Chat>, ApplicationError> {
        if filter.limit == 0 {
            return Ok(Vec::new());
        }

        let request = PageRequest {
            page_number: filter.page.saturating_add(1),
            page_size: filter.limit,
        };
        let page = self.gateway.fetch_contacts(request, None).await?;

        let mut chats = Vec::with_capacity(page.items.len());
        for contact in &page.items {
            let chat = Chat::from_contact(contact);
            if let Some(query) = filter.query.as_deref() {
                if !chat.matches_query(query) {
                    continue;
                }
            }
            let chat = if filter.include_last_message {
                self.attach_last_message(chat, contact).await?
            } else {
                chat
            };
            chats.push(chat);
        }

        chats.sort_by(|a, b| filter.sort_by.compare(a, b));
        info!(count = chats.len(), "Listed chats");
        Ok(chats)
    }

    /// Get the chat with a contact
    #[instrument(skip(self), fields(chat = %chat_id))]
    pub async fn get_chat(
        &self,
        chat_id: &WhatsAppId,
        include_last_message: bool,
    ) -> Result<Chat, ApplicationError> {
        let contact = self.find_contact(chat_id).await?;
        let chat = Chat::from_contact(&contact);

        if include_last_message {
            let last = self.last_message(chat_id).await?;
            Ok(chat.with_last_message(last))
        } else {
            Ok(chat)
        }
    }

    /// Get the direct (1:1) chat with a contact
    ///
    /// Every Wati chat is direct, so this resolves exactly like [`Self::get_chat`].
    pub async fn get_direct_chat_by_contact(
        &self,
        contact: &WhatsAppId,
    ) -> Result<Chat, ApplicationError> {
        self.get_chat(contact, true).await
    }

    /// All chats involving a contact: the direct chat, or none
    #[instrument(skip(self), fields(contact = %contact))]
    pub async fn get_contact_chats(
        &self,
        contact: &WhatsAppId,
    ) -> Result<Vec<Chat>, ApplicationError> {
        match self.get_chat(contact, true).await {
            Ok(chat) => Ok(vec![chat]),
            Err(ApplicationError::NotFound(what)) => {
                debug!(%what, "Contact has no chat");
                Ok(Vec::new())
            },
            Err(e) => Err(e),
        }
    }

    async fn find_contact(&self, chat_id: &WhatsAppId) -> Result<Contact, ApplicationError> {
        let page = self
            .gateway
            .fetch_contacts(
                PageRequest::first(self.policy.contacts_page_size),
                Some(chat_id.as_str().to_string()),
            )
            .await?;

        page.items
            .into_iter()
            .find(|c| contact_waid(c).as_ref() == Some(chat_id))
            .ok_or_else(|| ApplicationError::not_found(format!("Chat {chat_id}")))
    }

    async fn attach_last_message(
        &self,
        chat: Chat,
        contact: &Contact,
    ) -> Result<Chat, ApplicationError> {
        let Some(waid) = contact_waid(contact) else {
            warn!(id = %contact.id, "Contact has no usable WhatsApp ID, skipping last message");
            return Ok(chat);
        };
        let last = self.last_message(&waid).await?;
        Ok(chat.with_last_message(last))
    }

    async fn last_message(&self, chat: &WhatsAppId) -> Result<Option<Message>, ApplicationError> {
        let page = self.gateway.fetch_messages(chat, PageRequest::first(1)).await?;
        Ok(page.items.into_iter().min_by(Message::newest_first_cmp))
    }
}

/// WhatsApp ID of a contact, falling back to its phone number
fn contact_waid(contact: &Contact) -> Option<WhatsAppId> {
    WhatsAppId::new(contact.id.as_str())
        .or_else(|_| WhatsAppId::new(contact.phone.as_str()))
        .ok()
}

/// IDs of the `count` most recent chats, as ordered by the provider
pub(crate) async fn recent_chat_ids(
    gateway: &dyn WhatsAppGatewayPort,
    count: u32,
) -> Result<Vec<WhatsAppId>, ApplicationError> {
    let page = gateway
        .fetch_contacts(PageRequest::first(count.max(1)), None)
        .await?;
    Ok(page.items.iter().filter_map(contact_waid).collect())
}
