//! Request payloads for Wati send endpoints

use domain::{InteractiveHeader, InteractiveMessage, MediaCategory, MediaSource, file_name_of};
use serde::Serialize;

/// Body of `sendInteractiveButtonsMessage`
#[derive(Debug, Serialize)]
pub struct InteractiveButtonsPayload<'a> {
    body: &'a str,
    buttons: Vec<ButtonPayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<HeaderPayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ButtonPayload<'a> {
    text: &'a str,
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct HeaderPayload<'a> {
    #[serde(rename = "type")]
    header_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<MediaPayload<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MediaPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'a str>,
}

impl<'a> From<&'a InteractiveMessage> for InteractiveButtonsPayload<'a> {
    fn from(message: &'a InteractiveMessage) -> Self {
        Self {
            body: message.body(),
            buttons: message
                .buttons()
                .iter()
                .map(|b| ButtonPayload {
                    text: &b.label,
                    id: &b.id,
                })
                .collect(),
            header: message.header().map(HeaderPayload::from),
            footer: message.footer(),
        }
    }
}

impl<'a> From<&'a InteractiveHeader> for HeaderPayload<'a> {
    fn from(header: &'a InteractiveHeader) -> Self {
        match header {
            InteractiveHeader::Text { text } => Self {
                header_type: "Text",
                text: Some(text),
                media: None,
            },
            InteractiveHeader::Media { category, source } => Self {
                header_type: header_type(*category),
                text: None,
                media: Some(match source {
                    MediaSource::Url(url) => MediaPayload {
                        url: Some(url),
                        file_name: None,
                    },
                    MediaSource::LocalPath(path) => MediaPayload {
                        url: None,
                        file_name: Some(file_name_of(path)),
                    },
                }),
            },
        }
    }
}

const fn header_type(category: MediaCategory) -> &'static str {
    match category {
        MediaCategory::Image => "Image",
        MediaCategory::Video => "Video",
        MediaCategory::Document | MediaCategory::Audio => "Document",
    }
}
