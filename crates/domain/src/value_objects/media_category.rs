//! Media category value object

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Category of a media attachment accepted by WhatsApp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    /// Still images (jpeg, png, webp, gif)
    Image,
    /// Video clips
    Video,
    /// Any other file sent as a document
    Document,
    /// Audio files
    Audio,
}

/// Extension -> MIME type table used when sending local files
const MIME_TABLE: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("3gp", "video/3gpp"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/ogg"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("wav", "audio/wav"),
    ("txt", "text/plain"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
];

/// Fallback MIME type for unknown extensions
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

impl MediaCategory {
    /// All supported categories
    pub const ALL: [Self; 4] = [Self::Image, Self::Video, Self::Document, Self::Audio];

    /// Lowercase name as used in tool arguments
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Document => "document",
            Self::Audio => "audio",
        }
    }

    /// Derive the category from a MIME type
    #[must_use]
    pub fn from_mime(mime_type: &str) -> Self {
        let base = mime_type.split(';').next().unwrap_or(mime_type).trim();
        match base.split('/').next() {
            Some("image") => Self::Image,
            Some("video") => Self::Video,
            Some("audio") => Self::Audio,
            _ => Self::Document,
        }
    }

    /// Map a provider message type (`image`, `voice`, `sticker`, ...) to a category
    ///
    /// Returns `None` for non-media message types such as `text` or `location`.
    #[must_use]
    pub fn from_message_type(message_type: &str) -> Option<Self> {
        match message_type.to_ascii_lowercase().as_str() {
            "image" | "sticker" => Some(Self::Image),
            "video" => Some(Self::Video),
            "document" | "file" => Some(Self::Document),
            "audio" | "voice" | "ptt" => Some(Self::Audio),
            _ => None,
        }
    }

    /// Infer the category of a local file from its extension
    #[must_use]
    pub fn infer_from_path(path: &Path) -> Self {
        Self::from_mime(mime_type_for_path(path))
    }
}

/// Guess the MIME type of a file from its extension
#[must_use]
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_MIME_TYPE;
    };
    let ext = ext.to_ascii_lowercase();
    MIME_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map_or(DEFAULT_MIME_TYPE, |(_, mime)| *mime)
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "document" => Ok(Self::Document),
            "audio" => Ok(Self::Audio),
            _ => Err(DomainError::UnsupportedMedia(s.to_string())),
        }
    }
}
