//! Domain entities - read-through projections of provider state

mod chat;
mod contact;
mod delivery;
mod interactive_message;
mod media;
mod message;
mod pagination;

pub use chat::{Chat, ChatSort, ContactRef};
pub use contact::Contact;
pub use delivery::DeliveryReceipt;
pub use interactive_message::{
    InteractiveButton, InteractiveHeader, InteractiveMessage, InteractiveMessageBuilder,
    MAX_BODY_CHARS, MAX_BUTTON_LABEL_CHARS, MAX_BUTTONS, MAX_FOOTER_CHARS, MAX_HEADER_TEXT_CHARS,
    MediaSource,
};
pub use media::{MediaReference, MediaUpload, file_name_of};
pub use message::{
    DeliveryStatus, Direction, Message, MessageBody, sort_chronological, sort_newest_first,
};
pub use pagination::{Page, PageRequest};
