//! Media service - sending local or remote files and downloading received media

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use domain::{
    DeliveryReceipt, MediaCategory, MediaSource, MediaUpload, WhatsAppId, file_name_of,
    mime_type_for_path,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::WhatsAppGatewayPort,
    services::{
        PaginationPolicy,
        paging::{Step, walk_messages},
    },
};

/// Service for media transfer
pub struct MediaService {
    gateway: Arc<dyn WhatsAppGatewayPort>,
    policy: PaginationPolicy,
    scratch_dir: PathBuf,
}

impl fmt::Debug for MediaService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaService")
            .field("scratch_dir", &self.scratch_dir)
            .finish_non_exhaustive()
    }
}

impl MediaService {
    /// Create a new media service downloading into `scratch_dir`
    pub fn new(
        gateway: Arc<dyn WhatsAppGatewayPort>,
        policy: PaginationPolicy,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gateway,
            policy,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Directory downloads are written to
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Send a local file or a file published at an `http(s)` URL
    ///
    /// The category is inferred from the file name when not given. URL
    /// sources are fetched into memory and named after their last path
    /// segment. Wati attaches and sends in one request, so a rejected send
    /// leaves no orphaned upload behind to clean up.
    #[instrument(skip(self, caption), fields(recipient = %recipient))]
    pub async fn send_file(
        &self,
        recipient: &WhatsAppId,
        media_path: &str,
        category: Option<MediaCategory>,
        caption: Option<String>,
    ) -> Result<DeliveryReceipt, ApplicationError> {
        let upload = match MediaSource::parse(media_path) {
            MediaSource::Url(url) => self.fetch_upload(&url, category).await?,
            MediaSource::LocalPath(path) => {
                let path = Path::new(&path);
                let category = category.unwrap_or_else(|| MediaCategory::infer_from_path(path));
                read_upload(path, category).await?
            },
        };
        debug!(file_name = %upload.file_name, mime = %upload.mime_type, size = upload.data.len(), "Prepared upload");

        let category = upload.category;
        let receipt = self.gateway.send_file(recipient, upload, caption).await?;
        info!(accepted = receipt.accepted, category = %category, "File sent");
        Ok(receipt)
    }

    /// Send an audio file through the generic file attachment
    ///
    /// Recipients get a regular audio attachment, not a recorded voice note.
    pub async fn send_audio_message(
        &self,
        recipient: &WhatsAppId,
        media_path: &str,
    ) -> Result<DeliveryReceipt, ApplicationError> {
        self.send_file(recipient, media_path, Some(MediaCategory::Audio), None)
            .await
    }

    async fn fetch_upload(
        &self,
        url: &str,
        category: Option<MediaCategory>,
    ) -> Result<MediaUpload, ApplicationError> {
        let file_name = remote_file_name(url).ok_or_else(|| {
            ApplicationError::validation(format!("Cannot derive a file name from {url}"))
        })?;

        let name_path = Path::new(file_name);
        let data = self.gateway.fetch_remote_file(url).await?;
        Ok(MediaUpload {
            file_name: file_name.to_string(),
            mime_type: mime_type_for_path(name_path).to_string(),
            category: category.unwrap_or_else(|| MediaCategory::infer_from_path(name_path)),
            data,
        })
    }

    /// Download media into the scratch directory and return its absolute path
    ///
    /// With `chat` the argument is a message ID whose media is resolved from
    /// the chat history; otherwise it is the provider file name. Downloads
    /// are named after the remote file, so repeating one overwrites it.
    #[instrument(skip(self))]
    pub async fn download_media(
        &self,
        message_id_or_file: &str,
        chat: Option<&WhatsAppId>,
    ) -> Result<PathBuf, ApplicationError> {
        let target = message_id_or_file.trim();
        if target.is_empty() {
            return Err(ApplicationError::validation(
                "message_id must be a message ID or a media file name",
            ));
        }

        let locator = match chat {
            Some(chat) => self.locator_for_message(chat, target).await?,
            None => target.to_string(),
        };

        let path = self
            .gateway
            .download_media(&locator, &self.scratch_dir)
            .await?;
        let absolute = tokio::fs::canonicalize(&path).await.map_err(|e| {
            ApplicationError::Internal(format!("Cannot resolve {}: {e}", path.display()))
        })?;

        info!(path = %absolute.display(), "Media downloaded");
        Ok(absolute)
    }

    async fn locator_for_message(
        &self,
        chat: &WhatsAppId,
        message_id: &str,
    ) -> Result<String, ApplicationError> {
        let messages = walk_messages(
            self.gateway.as_ref(),
            chat,
            self.policy.page_size,
            self.policy.max_pages,
            |seen| {
                if seen.iter().any(|m| m.id == message_id) {
                    Step::Stop
                } else {
                    Step::Continue
                }
            },
        )
        .await?;

        let message = messages
            .iter()
            .find(|m| m.id == message_id)
            .ok_or_else(|| ApplicationError::not_found(format!("Message {message_id} in {chat}")))?;

        message
            .media()
            .map(|media| media.remote_locator.clone())
            .ok_or_else(|| {
                warn!(message_id, "Message carries no media");
                ApplicationError::validation(format!("Message {message_id} has no media"))
            })
    }
}

/// Last path segment of a URL, `None` when the URL has no usable path
fn remote_file_name(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let (_, path) = rest.split_once('/')?;
    let name = file_name_of(path);
    (!name.is_empty() && name != "." && name != "..").then_some(name)
}

/// Read a local file into an upload
///
/// Fails with [`ApplicationError::FileNotFound`] before any network call when
/// the path does not name a regular file.
pub(crate) async fn read_upload(
    path: &Path,
    category: MediaCategory,
) -> Result<MediaUpload, ApplicationError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {},
        _ => return Err(ApplicationError::FileNotFound(path.to_path_buf())),
    }

    let data = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApplicationError::FileNotFound(path.to_path_buf())
        } else {
            ApplicationError::Internal(format!("Cannot read {}: {e}", path.display()))
        }
    })?;

    let file_name = file_name_of(&path.to_string_lossy()).to_string();
    Ok(MediaUpload {
        file_name,
        mime_type: mime_type_for_path(path).to_string(),
        category,
        data,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use domain::{Direction, MediaReference, Message, MessageBody, Page};
    use mockall::predicate::always;

    use super::*;
    use crate::{error::ErrorKind, ports::MockWhatsAppGatewayPort};

    fn recipient() -> WhatsAppId {
        WhatsAppId::new("491701234567").unwrap()
    }

    fn local(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    fn service(mock: MockWhatsAppGatewayPort, scratch: &Path) -> MediaService {
        MediaService::new(Arc::new(mock), PaginationPolicy::default(), scratch)
    }

    fn media_message(id: &str, file: &str) -> Message {
        Message {
            id: id.to_string(),
            chat_id: "491701234567".to_string(),
            direction: Direction::Inbound,
            sender: "491701234567".to_string(),
            timestamp: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
            body: MessageBody::Media {
                media: MediaReference::remote(file, MediaCategory::Image),
                caption: None,
            },
            status: domain::DeliveryStatus::Read,
        }
    }

    // ========================================================================
    // send_file
    // ========================================================================

    #[tokio::test]
    async fn missing_file_makes_no_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_file().never();

        let err = service(mock, dir.path())
            .send_file(&recipient(), &local(&dir.path().join("nope.pdf")), None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[tokio::test]
    async fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_file().never();

        let err = service(mock, dir.path())
            .send_file(&recipient(), &local(dir.path()), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[tokio::test]
    async fn sends_file_with_inferred_category_and_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_file()
            .withf(|to, upload, caption| {
                to.as_str() == "491701234567"
                    && upload.file_name == "invoice.pdf"
                    && upload.mime_type == "application/pdf"
                    && upload.category == MediaCategory::Document
                    && upload.data == b"%PDF-1.4"
                    && caption.as_deref() == Some("May invoice")
            })
            .times(1)
            .returning(|_, _, _| Ok(DeliveryReceipt::accepted(None)));

        let receipt = service(mock, dir.path())
            .send_file(&recipient(), &local(&path), None, Some("May invoice".to_string()))
            .await
            .unwrap();
        assert!(receipt.accepted);
    }

    #[tokio::test]
    async fn explicit_category_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_file()
            .withf(|_, upload, _| upload.category == MediaCategory::Document)
            .times(1)
            .returning(|_, _, _| Ok(DeliveryReceipt::accepted(None)));

        service(mock, dir.path())
            .send_file(&recipient(), &local(&path), Some(MediaCategory::Document), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_send_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"jpg").unwrap();

        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_file().returning(|_, _, _| {
            Ok(DeliveryReceipt::rejected(Some(
                "Contact has not opted in".to_string(),
            )))
        });

        let receipt = service(mock, dir.path())
            .send_file(&recipient(), &local(&path), None, None)
            .await
            .unwrap();
        assert!(!receipt.accepted);
    }

    #[tokio::test]
    async fn audio_message_forces_audio_category() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.ogg");
        std::fs::write(&path, b"OggS").unwrap();

        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_send_file()
            .withf(|_, upload, caption| {
                upload.category == MediaCategory::Audio
                    && upload.mime_type == "audio/ogg"
                    && caption.is_none()
            })
            .times(1)
            .returning(|_, _, _| Ok(DeliveryReceipt::accepted(None)));

        service(mock, dir.path())
            .send_audio_message(&recipient(), &local(&path))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn url_source_is_fetched_then_sent() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_fetch_remote_file()
            .withf(|url| url == "https://cdn.example.com/media/photo.png?sig=abc")
            .times(1)
            .returning(|_| Ok(b"png".to_vec()));
        mock.expect_send_file()
            .withf(|_, upload, caption| {
                upload.file_name == "photo.png"
                    && upload.mime_type == "image/png"
                    && upload.category == MediaCategory::Image
                    && upload.data == b"png"
                    && caption.as_deref() == Some("Look")
            })
            .times(1)
            .returning(|_, _, _| Ok(DeliveryReceipt::accepted(None)));

        let receipt = service(mock, dir.path())
            .send_file(
                &recipient(),
                "https://cdn.example.com/media/photo.png?sig=abc",
                None,
                Some("Look".to_string()),
            )
            .await
            .unwrap();
        assert!(receipt.accepted);
    }

    #[tokio::test]
    async fn url_without_file_name_is_rejected_before_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_fetch_remote_file().never();
        mock.expect_send_file().never();

        let err = service(mock, dir.path())
            .send_file(&recipient(), "https://cdn.example.com", None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn unreachable_url_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_fetch_remote_file()
            .returning(|url| Err(ApplicationError::not_found(format!("Remote file {url}"))));
        mock.expect_send_file().never();

        let err = service(mock, dir.path())
            .send_audio_message(&recipient(), "http://cdn.example.com/voice.ogg")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn remote_file_name_uses_last_path_segment() {
        assert_eq!(
            remote_file_name("https://cdn.example.com/a/b/report.pdf?x=1#top"),
            Some("report.pdf")
        );
        assert_eq!(remote_file_name("https://cdn.example.com/"), None);
        assert_eq!(remote_file_name("https://cdn.example.com"), None);
        assert_eq!(remote_file_name("https://cdn.example.com/.."), None);
    }

    // ========================================================================
    // download_media
    // ========================================================================

    fn writing_gateway(expected_locator: &'static str) -> MockWhatsAppGatewayPort {
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_download_media()
            .withf(move |locator, _| locator == expected_locator)
            .returning(|locator, dir| {
                let path = dir.join(file_name_of(locator));
                std::fs::create_dir_all(dir).unwrap();
                std::fs::write(&path, b"bytes").unwrap();
                Ok(path)
            });
        mock
    }

    #[tokio::test]
    async fn download_by_file_name_returns_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(writing_gateway("photo.jpg"), dir.path());

        let first = service.download_media("photo.jpg", None).await.unwrap();
        let second = service.download_media("photo.jpg", None).await.unwrap();

        assert!(first.is_absolute());
        assert_eq!(first, second);
        assert!(first.ends_with("photo.jpg"));
    }

    #[tokio::test]
    async fn download_by_message_id_resolves_locator() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = writing_gateway("data/images/abc.jpg");
        mock.expect_fetch_messages()
            .with(always(), always())
            .times(1)
            .returning(|_, _| {
                Ok(Page::new(vec![
                    Message::text("t1", "491701234567", Utc::now(), "hi"),
                    media_message("img-1", "data/images/abc.jpg"),
                ]))
            });

        let path = service(mock, dir.path())
            .download_media("img-1", Some(&recipient()))
            .await
            .unwrap();
        assert!(path.ends_with("abc.jpg"));
    }

    #[tokio::test]
    async fn download_of_text_message_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_fetch_messages().returning(|_, _| {
            Ok(Page::new(vec![Message::text(
                "t1",
                "491701234567",
                Utc::now(),
                "hi",
            )]))
        });
        mock.expect_download_media().never();

        let err = service(mock, dir.path())
            .download_media("t1", Some(&recipient()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn download_of_unknown_message_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_fetch_messages()
            .returning(|_, _| Ok(Page::new(vec![])));

        let err = service(mock, dir.path())
            .download_media("gone", Some(&recipient()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn upstream_missing_media_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockWhatsAppGatewayPort::new();
        mock.expect_download_media()
            .returning(|_, _| Err(ApplicationError::not_found("media expired.jpg")));

        let err = service(mock, dir.path())
            .download_media("expired.jpg", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
