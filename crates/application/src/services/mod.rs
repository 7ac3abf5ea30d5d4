//! Application services - Use case implementations
//!
//! Every service talks to the provider through [`WhatsAppGatewayPort`] and
//! performs a bounded, sequential series of calls per operation.
//!
//! [`WhatsAppGatewayPort`]: crate::ports::WhatsAppGatewayPort

mod chat_service;
mod contact_service;
mod media_service;
mod message_service;
mod outbound_service;
mod paging;

pub use chat_service::{ChatFilter, ChatService};
pub use contact_service::ContactService;
pub use media_service::MediaService;
pub use message_service::{DEFAULT_MESSAGE_LIMIT, MessageFilter, MessageService};
pub use outbound_service::OutboundService;
pub use paging::PaginationPolicy;
