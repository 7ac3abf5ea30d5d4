//! Wati gateway adapter - Implements WhatsAppGatewayPort using integration_wati

use std::path::{Path, PathBuf};

use application::error::ApplicationError;
use application::ports::WhatsAppGatewayPort;
use async_trait::async_trait;
use domain::{
    Contact, DeliveryReceipt, InteractiveMessage, MediaUpload, Message, Page, PageRequest,
    WhatsAppId,
};
use integration_wati::{WatiClient, WatiClientConfig, WatiError};
use tracing::{debug, instrument, warn};

/// Adapter that implements `WhatsAppGatewayPort` using `WatiClient`
#[derive(Clone)]
pub struct WatiGatewayAdapter {
    client: WatiClient,
}

impl std::fmt::Debug for WatiGatewayAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatiGatewayAdapter").finish_non_exhaustive()
    }
}

impl WatiGatewayAdapter {
    /// Create a new adapter
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the client settings are invalid.
    pub fn new(config: WatiClientConfig) -> Result<Self, ApplicationError> {
        let client = WatiClient::new(config).map_err(Self::map_error)?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    #[must_use]
    pub const fn from_client(client: WatiClient) -> Self {
        Self { client }
    }

    /// Map integration errors to application errors
    fn map_error(err: WatiError) -> ApplicationError {
        match err {
            WatiError::AuthenticationFailed { status, message } => {
                ApplicationError::Authentication(format!("HTTP {status}: {message}"))
            },
            WatiError::RateLimitExceeded { retry_after_secs } => {
                debug!(retry_after = ?retry_after_secs, "Wati rate limited");
                ApplicationError::RateLimited { retry_after_secs }
            },
            WatiError::Api { status: 404, message } => ApplicationError::NotFound(message),
            WatiError::Api { status, message } => {
                ApplicationError::Remote(format!("HTTP {status}: {message}"))
            },
            e @ (WatiError::ConnectionFailed(_)
            | WatiError::RequestFailed(_)
            | WatiError::Timeout { .. }) => ApplicationError::Transport(e.to_string()),
            WatiError::Schema(e) => ApplicationError::Schema(e),
            WatiError::Configuration(e) => ApplicationError::Configuration(e),
            WatiError::InvalidInput(e) => ApplicationError::validation(e),
            WatiError::Io(e) => {
                warn!(error = %e, "Local I/O failure during media transfer");
                ApplicationError::Internal(format!("I/O error: {e}"))
            },
        }
    }
}

#[async_trait]
impl WhatsAppGatewayPort for WatiGatewayAdapter {
    async fn fetch_contacts(
        &self,
        page: PageRequest,
        name: Option<String>,
    ) -> Result<Page<Contact>, ApplicationError> {
        self.client
            .get_contacts(page, name.as_deref())
            .await
            .map_err(Self::map_error)
    }

    async fn fetch_messages(
        &self,
        chat: &WhatsAppId,
        page: PageRequest,
    ) -> Result<Page<Message>, ApplicationError> {
        self.client
            .get_messages(chat.as_str(), page)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, text), fields(recipient = %recipient))]
    async fn send_text(
        &self,
        recipient: &WhatsAppId,
        text: &str,
    ) -> Result<DeliveryReceipt, ApplicationError> {
        self.client
            .send_session_message(recipient.as_str(), text)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, upload, caption), fields(recipient = %recipient))]
    async fn send_file(
        &self,
        recipient: &WhatsAppId,
        upload: MediaUpload,
        caption: Option<String>,
    ) -> Result<DeliveryReceipt, ApplicationError> {
        self.client
            .send_session_file(recipient.as_str(), upload, caption.as_deref())
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, message, header_upload), fields(recipient = %recipient))]
    async fn send_interactive(
        &self,
        recipient: &WhatsAppId,
        message: &InteractiveMessage,
        header_upload: Option<MediaUpload>,
    ) -> Result<DeliveryReceipt, ApplicationError> {
        self.client
            .send_interactive_buttons(recipient.as_str(), message, header_upload)
            .await
            .map_err(Self::map_error)
    }

    async fn download_media(
        &self,
        remote_locator: &str,
        directory: &Path,
    ) -> Result<PathBuf, ApplicationError> {
        self.client
            .get_media(remote_locator, directory)
            .await
            .map_err(|e| match e {
                WatiError::Api { status: 404, .. } => ApplicationError::NotFound(format!(
                    "Media {remote_locator} no longer exists upstream"
                )),
                other => Self::map_error(other),
            })
    }

    #[instrument(skip(self))]
    async fn fetch_remote_file(&self, url: &str) -> Result<Vec<u8>, ApplicationError> {
        self.client.fetch_url(url).await.map_err(|e| match e {
            WatiError::Api { status: 404, .. } => {
                ApplicationError::NotFound(format!("Remote file {url}"))
            },
            other => Self::map_error(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use application::ErrorKind;

    use super::*;

    fn kind(err: WatiError) -> ErrorKind {
        WatiGatewayAdapter::map_error(err).kind()
    }

    #[test]
    fn maps_status_errors() {
        assert_eq!(
            kind(WatiError::AuthenticationFailed {
                status: 401,
                message: "bad token".into()
            }),
            ErrorKind::AuthError
        );
        assert_eq!(
            kind(WatiError::Api {
                status: 404,
                message: "gone".into()
            }),
            ErrorKind::NotFound
        );
        assert_eq!(
            kind(WatiError::Api {
                status: 500,
                message: "boom".into()
            }),
            ErrorKind::RemoteError
        );
    }

    #[test]
    fn rate_limit_keeps_retry_hint() {
        let err = WatiGatewayAdapter::map_error(WatiError::RateLimitExceeded {
            retry_after_secs: Some(42),
        });
        assert_eq!(err.kind(), ErrorKind::RateLimitError);
        assert_eq!(err.retry_after_secs(), Some(42));
    }

    #[test]
    fn transport_failures_are_retryable() {
        for err in [
            WatiError::ConnectionFailed("refused".into()),
            WatiError::RequestFailed("reset".into()),
            WatiError::Timeout { timeout_secs: 30 },
        ] {
            let mapped = WatiGatewayAdapter::map_error(err);
            assert_eq!(mapped.kind(), ErrorKind::TransportError);
            assert!(mapped.is_retryable());
        }
    }

    #[test]
    fn schema_and_local_failures() {
        assert_eq!(kind(WatiError::schema("no id")), ErrorKind::SchemaError);
        assert_eq!(
            kind(WatiError::Io(std::io::Error::other("disk full"))),
            ErrorKind::InternalError
        );
        assert_eq!(
            kind(WatiError::Configuration("tenant_id is required".into())),
            ErrorKind::InternalError
        );
    }

    #[test]
    fn invalid_input_is_validation_error() {
        assert_eq!(
            kind(WatiError::InvalidInput(
                "cannot derive a local file name from '..'".into()
            )),
            ErrorKind::ValidationError
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = WatiClientConfig::for_testing("http://localhost:1");
        config.tenant_id = String::new();
        assert!(WatiGatewayAdapter::new(config).is_err());
    }
}
