//! Value Objects - Immutable, identity-less domain primitives

mod media_category;
mod whatsapp_id;

pub use media_category::{DEFAULT_MIME_TYPE, MediaCategory, mime_type_for_path};
pub use whatsapp_id::WhatsAppId;
