//! Outbound service - text and interactive sends

use std::{fmt, path::Path, sync::Arc};

use domain::{DeliveryReceipt, InteractiveMessage, WhatsAppId};
use tracing::{info, instrument};

use crate::{error::ApplicationError, ports::WhatsAppGatewayPort, services::media_service::read_upload};

/// Service for sending messages
pub struct OutboundService {
    gateway: Arc<dyn WhatsAppGatewayPort>,
}

impl fmt::Debug for OutboundService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundService").finish_non_exhaustive()
    }
}

impl OutboundService {
    /// Create a new outbound service
    pub fn new(gateway: Arc<dyn WhatsAppGatewayPort>) -> Self {
        Self { gateway }
    }

    /// Send a text message
    ///
    /// Sends are not idempotent, so failures are never retried here.
    #[instrument(skip(self, text), fields(recipient = %recipient, text_len = text.len()))]
    pub async fn send_message(
        &self,
        recipient: &WhatsAppId,
        text: &str,
    ) -> Result<DeliveryReceipt, ApplicationError> {
        if text.trim().is_empty() {
            return Err(ApplicationError::validation("message must not be empty"));
        }

        let receipt = self.gateway.send_text(recipient, text).await?;
        info!(accepted = receipt.accepted, "Text message sent");
        Ok(receipt)
    }

    /// Send a validated interactive message
    ///
    /// Header media given as a local path is read and attached; URLs are
    /// passed through for the provider to fetch.
    #[instrument(skip(self, message), fields(recipient = %recipient, buttons = message.buttons().len()))]
    pub async fn send_interactive(
        &self,
        recipient: &WhatsAppId,
        message: &InteractiveMessage,
    ) -> Result<DeliveryReceipt, ApplicationError> {
        let header_upload = match message.local_header_media() {
            Some((path, category)) => Some(read_upload(Path::new(path), category).await?),
            None => None,
        };

        let receipt = self
            .gateway
            .send_interactive(recipient, message, header_upload)
            .await?;
        info!(accepted = receipt.accepted, "Interactive message sent");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use domain::MediaCategory;

    use super::*;
    use crate::{error::ErrorKind, ports::MockWhatsAppGatewayPort};

    fn recipient() -> WhatsAppId {
        WhatsAppId::new("491701234567").unwrap()
    }

    #[tokio::test]
    async fn sends_text() {
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_text()
            .withf(|to, text| to.as_str() == "491701234567" && text == "Hello")
            .times(1)
            .returning(|_, _| Ok(DeliveryReceipt::accepted(Some("queued".to_string()))));

        let receipt = OutboundService::new(Arc::new(mock))
            .send_message(&recipient(), "Hello")
            .await
            .unwrap();
        assert!(receipt.accepted);
        assert_eq!(receipt.message.as_deref(), Some("queued"));
    }

    #[tokio::test]
    async fn blank_text_is_rejected_without_call() {
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_text().never();

        let err = OutboundService::new(Arc::new(mock))
            .send_message(&recipient(), "  \n")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn rejected_delivery_is_a_result() {
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_text().returning(|_, _| {
            Ok(DeliveryReceipt::rejected(Some(
                "Ticket has expired".to_string(),
            )))
        });

        let receipt = OutboundService::new(Arc::new(mock))
            .send_message(&recipient(), "Hi")
            .await
            .unwrap();
        assert!(!receipt.accepted);
    }

    #[tokio::test]
    async fn interactive_with_url_header_has_no_upload() {
        let message = InteractiveMessage::builder("Pick one")
            .button("yes", "Yes")
            .button("no", "No")
            .header_image("https://cdn.example.com/banner.png")
            .build()
            .unwrap();

        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_interactive()
            .withf(|_, msg, upload| msg.buttons().len() == 2 && upload.is_none())
            .times(1)
            .returning(|_, _, _| Ok(DeliveryReceipt::accepted(None)));

        OutboundService::new(Arc::new(mock))
            .send_interactive(&recipient(), &message)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn interactive_with_local_header_attaches_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let message = InteractiveMessage::builder("Our menu")
            .button("order", "Order")
            .header_document(&path.to_string_lossy())
            .build()
            .unwrap();

        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_interactive()
            .withf(|_, _, upload| {
                upload.as_ref().is_some_and(|u| {
                    u.file_name == "menu.pdf"
                        && u.category == MediaCategory::Document
                        && u.mime_type == "application/pdf"
                })
            })
            .times(1)
            .returning(|_, _, _| Ok(DeliveryReceipt::accepted(None)));

        OutboundService::new(Arc::new(mock))
            .send_interactive(&recipient(), &message)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn interactive_with_missing_local_header_fails_before_call() {
        let message = InteractiveMessage::builder("Our menu")
            .header_image("/definitely/not/here.png")
            .build()
            .unwrap();

        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_interactive().never();

        let err = OutboundService::new(Arc::new(mock))
            .send_interactive(&recipient(), &message)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }
}
