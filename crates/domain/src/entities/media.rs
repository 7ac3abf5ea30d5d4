//! Media references and uploads
//!
//! Both types live only for the duration of a single send or download.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::value_objects::MediaCategory;

/// Reference to a media file held by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    /// File name as known to the provider
    pub file_name: String,
    /// Media category
    pub category: MediaCategory,
    /// MIME type, when the provider reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Opaque provider locator (file name or URL)
    pub remote_locator: String,
    /// Local path once downloaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
}

impl MediaReference {
    /// Create a reference to remote media
    #[must_use]
    pub fn remote(remote_locator: impl Into<String>, category: MediaCategory) -> Self {
        let remote_locator = remote_locator.into();
        let file_name = file_name_of(&remote_locator).to_string();
        Self {
            file_name,
            category,
            mime_type: None,
            remote_locator,
            local_path: None,
        }
    }

    /// Record where the media was stored locally
    #[must_use]
    pub fn with_local_path(mut self, path: PathBuf) -> Self {
        self.local_path = Some(path);
        self
    }
}

/// A local file read into memory, ready to be attached to a message
#[derive(Clone)]
pub struct MediaUpload {
    /// File name sent to the provider
    pub file_name: String,
    /// MIME type of the content
    pub mime_type: String,
    /// Media category
    pub category: MediaCategory,
    /// Raw file content
    pub data: Vec<u8>,
}

impl std::fmt::Debug for MediaUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("category", &self.category)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Last path segment of a locator (`data/images/a.jpg` -> `a.jpg`)
///
/// Query strings are dropped so URLs map to their file name.
#[must_use]
pub fn file_name_of(locator: &str) -> &str {
    let without_query = locator.split(['?', '#']).next().unwrap_or(locator);
    without_query
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(without_query)
}
