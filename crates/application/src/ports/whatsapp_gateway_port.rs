//! WhatsApp gateway port - Interface to the WhatsApp Business provider
//!
//! One method per provider capability. Implementations perform exactly one
//! provider request per call; paging and filtering live in the services.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use domain::{
    Contact, DeliveryReceipt, InteractiveMessage, MediaUpload, Message, Page, PageRequest,
    WhatsAppId,
};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the WhatsApp Business provider
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WhatsAppGatewayPort: Send + Sync {
    /// Fetch one page of contacts, optionally narrowed by the provider's name filter
    async fn fetch_contacts(
        &self,
        page: PageRequest,
        name: Option<String>,
    ) -> Result<Page<Contact>, ApplicationError>;

    /// Fetch one page of a chat's messages, newest first
    async fn fetch_messages(
        &self,
        chat: &WhatsAppId,
        page: PageRequest,
    ) -> Result<Page<Message>, ApplicationError>;

    /// Send a text message
    async fn send_text(
        &self,
        recipient: &WhatsAppId,
        text: &str,
    ) -> Result<DeliveryReceipt, ApplicationError>;

    /// Attach a file and send it
    async fn send_file(
        &self,
        recipient: &WhatsAppId,
        upload: MediaUpload,
        caption: Option<String>,
    ) -> Result<DeliveryReceipt, ApplicationError>;

    /// Send an interactive message; `header_upload` carries local header media
    async fn send_interactive(
        &self,
        recipient: &WhatsAppId,
        message: &InteractiveMessage,
        header_upload: Option<MediaUpload>,
    ) -> Result<DeliveryReceipt, ApplicationError>;

    /// Download a media file into `directory` and return the local path
    async fn download_media(
        &self,
        remote_locator: &str,
        directory: &Path,
    ) -> Result<PathBuf, ApplicationError>;

    /// Fetch a file published at an `http(s)` URL
    async fn fetch_remote_file(&self, url: &str) -> Result<Vec<u8>, ApplicationError>;
}
