//! Typed Wati v1 endpoints on top of [`WatiClient`]

use std::path::{Path, PathBuf};

use domain::{
    Contact, DeliveryReceipt, InteractiveMessage, MediaUpload, Message, Page, PageRequest,
    file_name_of,
};
use reqwest::{
    Method,
    multipart::{Form, Part},
};
use tracing::{debug, info, instrument};

use crate::{WatiClient, error::WatiError, normalize, payload::InteractiveButtonsPayload};

const GET_CONTACTS: &str = "api/v1/getContacts";
const GET_MESSAGES: &str = "api/v1/getMessages";
const SEND_SESSION_MESSAGE: &str = "api/v1/sendSessionMessage";
const SEND_SESSION_FILE: &str = "api/v1/sendSessionFile";
const SEND_INTERACTIVE_BUTTONS: &str = "api/v1/sendInteractiveButtonsMessage";
const GET_MEDIA: &str = "api/v1/getMedia";

impl WatiClient {
    /// Fetch one page of contacts, optionally filtered by name on the provider side
    ///
    /// # Errors
    ///
    /// Transport, status and schema errors.
    #[instrument(skip(self), fields(page = page.page_number, size = page.page_size))]
    pub async fn get_contacts(
        &self,
        page: PageRequest,
        name: Option<&str>,
    ) -> Result<Page<Contact>, WatiError> {
        let mut query = vec![
            ("pageSize", page.page_size.to_string()),
            ("pageNumber", page.page_number.to_string()),
        ];
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            query.push(("name", name.to_string()));
        }

        let (_, body) = self.call(Method::GET, GET_CONTACTS, &query, None).await?;
        let contacts = normalize::contacts_page(&body)?;
        debug!(count = contacts.items.len(), "Fetched contacts");
        Ok(contacts)
    }

    /// Fetch one page of messages of a chat, newest first as the provider returns them
    ///
    /// # Errors
    ///
    /// Transport, status and schema errors.
    #[instrument(skip(self), fields(page = page.page_number, size = page.page_size))]
    pub async fn get_messages(
        &self,
        whatsapp_id: &str,
        page: PageRequest,
    ) -> Result<Page<Message>, WatiError> {
        let query = [
            ("pageSize", page.page_size.to_string()),
            ("pageNumber", page.page_number.to_string()),
        ];
        let path = format!("{GET_MESSAGES}/{whatsapp_id}");

        let (_, body) = self.call(Method::GET, &path, &query, None).await?;
        let messages = normalize::messages_page(&body, whatsapp_id)?;
        debug!(
            count = messages.items.len(),
            total = ?messages.total,
            "Fetched messages"
        );
        Ok(messages)
    }

    /// Send a session text message
    ///
    /// # Errors
    ///
    /// Transport and status errors. A provider-level rejection is returned as
    /// a receipt with `accepted == false`.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn send_session_message(
        &self,
        whatsapp_id: &str,
        text: &str,
    ) -> Result<DeliveryReceipt, WatiError> {
        let path = format!("{SEND_SESSION_MESSAGE}/{whatsapp_id}");
        let query = [("messageText", text.to_string())];

        let (_, body) = self.call(Method::POST, &path, &query, None).await?;
        let receipt = normalize::delivery_receipt(&body);
        info!(accepted = receipt.accepted, "Session message sent");
        Ok(receipt)
    }

    /// Attach a file and send it in one multipart call
    ///
    /// # Errors
    ///
    /// Transport and status errors.
    #[instrument(skip(self, upload, caption), fields(file = %upload.file_name, size = upload.data.len()))]
    pub async fn send_session_file(
        &self,
        whatsapp_id: &str,
        upload: MediaUpload,
        caption: Option<&str>,
    ) -> Result<DeliveryReceipt, WatiError> {
        let path = format!("{SEND_SESSION_FILE}/{whatsapp_id}");
        let query: Vec<(&str, String)> = caption
            .filter(|c| !c.is_empty())
            .map(|c| ("caption", c.to_string()))
            .into_iter()
            .collect();

        let form = Form::new().part("file", file_part(upload)?);
        let (_, body) = self.post_multipart(&path, &query, form).await?;
        let receipt = normalize::delivery_receipt(&body);
        info!(accepted = receipt.accepted, "Session file sent");
        Ok(receipt)
    }

    /// Send an interactive buttons message
    ///
    /// When `header_upload` is given the header media is attached as a
    /// multipart `file` part next to the JSON `messageData`.
    ///
    /// # Errors
    ///
    /// Transport, status and serialization errors.
    #[instrument(skip(self, message, header_upload), fields(buttons = message.buttons().len()))]
    pub async fn send_interactive_buttons(
        &self,
        whatsapp_id: &str,
        message: &InteractiveMessage,
        header_upload: Option<MediaUpload>,
    ) -> Result<DeliveryReceipt, WatiError> {
        let query = [("whatsappNumber", whatsapp_id.to_string())];
        let payload = serde_json::to_value(InteractiveButtonsPayload::from(message))
            .map_err(|e| WatiError::schema(format!("interactive payload: {e}")))?;

        let (_, body) = match header_upload {
            Some(upload) => {
                let message_data = Part::text(payload.to_string())
                    .mime_str("application/json")
                    .map_err(|e| WatiError::RequestFailed(e.to_string()))?;
                let form = Form::new()
                    .part("file", file_part(upload)?)
                    .part("messageData", message_data);
                self.post_multipart(SEND_INTERACTIVE_BUTTONS, &query, form)
                    .await?
            },
            None => {
                self.call(Method::POST, SEND_INTERACTIVE_BUTTONS, &query, Some(&payload))
                    .await?
            },
        };

        let receipt = normalize::delivery_receipt(&body);
        info!(accepted = receipt.accepted, "Interactive message sent");
        Ok(receipt)
    }

    /// Download a media file into `directory`
    ///
    /// The local file is named after the last segment of the remote file
    /// name, so repeated downloads of the same media overwrite one path.
    ///
    /// # Errors
    ///
    /// A 404 surfaces as [`WatiError::Api`] (see [`WatiError::is_not_found`]);
    /// [`WatiError::InvalidInput`] when no local name can be derived; I/O
    /// errors when the directory cannot be created or written.
    #[instrument(skip(self, directory))]
    pub async fn get_media(&self, file_name: &str, directory: &Path) -> Result<PathBuf, WatiError> {
        let local_name = sanitize_file_name(file_name_of(file_name));
        if local_name.is_empty() {
            return Err(WatiError::InvalidInput(format!(
                "cannot derive a local file name from '{file_name}'"
            )));
        }

        tokio::fs::create_dir_all(directory).await?;
        let destination = directory.join(local_name);
        let query = [("fileName", file_name.to_string())];

        let bytes = self.download(GET_MEDIA, &query, &destination).await?;
        info!(bytes, path = %destination.display(), "Media downloaded");
        Ok(destination)
    }
}

fn file_part(upload: MediaUpload) -> Result<Part, WatiError> {
    Part::bytes(upload.data)
        .file_name(upload.file_name)
        .mime_str(&upload.mime_type)
        .map_err(|e| WatiError::RequestFailed(format!("Invalid MIME type: {e}")))
}

/// Keep a file name safe to join onto the scratch directory
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect();
    cleaned.trim_start_matches('.').trim().to_string()
}
