//! Interactive (button) message
//!
//! An [`InteractiveMessage`] can only be obtained through
//! [`InteractiveMessageBuilder::build`], which checks every structural limit
//! WhatsApp imposes and reports all violations at once.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{errors::DomainError, value_objects::MediaCategory};

/// Maximum number of reply buttons
pub const MAX_BUTTONS: usize = 3;
/// Maximum body length in characters
pub const MAX_BODY_CHARS: usize = 1024;
/// Maximum button label length in characters
pub const MAX_BUTTON_LABEL_CHARS: usize = 20;
/// Maximum header text length in characters
pub const MAX_HEADER_TEXT_CHARS: usize = 60;
/// Maximum footer length in characters
pub const MAX_FOOTER_CHARS: usize = 60;

/// A quick-reply button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveButton {
    /// Identifier returned when the button is tapped
    pub id: String,
    /// Visible label
    pub label: String,
}

/// Where header media comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MediaSource {
    /// Publicly reachable URL
    Url(String),
    /// File on the local machine, uploaded with the message
    LocalPath(String),
}

impl MediaSource {
    /// Classify a locator: `http://` and `https://` are URLs, anything else a local path
    #[must_use]
    pub fn parse(locator: &str) -> Self {
        let trimmed = locator.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::LocalPath(trimmed.to_string())
        }
    }

    /// The raw locator
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(s) | Self::LocalPath(s) => s,
        }
    }
}

/// Optional message header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractiveHeader {
    /// Text header
    Text {
        /// Header text
        text: String,
    },
    /// Image, video or document header
    Media {
        /// Media category of the header
        category: MediaCategory,
        /// Media location
        source: MediaSource,
    },
}

/// A validated interactive button message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractiveMessage {
    body: String,
    buttons: Vec<InteractiveButton>,
    header: Option<InteractiveHeader>,
    footer: Option<String>,
}

impl InteractiveMessage {
    /// Start building a message with the given body text
    #[must_use]
    pub fn builder(body: impl Into<String>) -> InteractiveMessageBuilder {
        InteractiveMessageBuilder::new(body)
    }

    /// Body text
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Buttons in display order
    #[must_use]
    pub fn buttons(&self) -> &[InteractiveButton] {
        &self.buttons
    }

    /// Header, if any
    #[must_use]
    pub const fn header(&self) -> Option<&InteractiveHeader> {
        self.header.as_ref()
    }

    /// Footer text, if any
    #[must_use]
    pub fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    /// Local file that has to be uploaded together with the message
    #[must_use]
    pub fn local_header_media(&self) -> Option<(&str, MediaCategory)> {
        match &self.header {
            Some(InteractiveHeader::Media {
                category,
                source: MediaSource::LocalPath(path),
            }) => Some((path.as_str(), *category)),
            _ => None,
        }
    }
}

/// Collects message parts and validates them in one go
#[derive(Debug, Clone, Default)]
pub struct InteractiveMessageBuilder {
    body: String,
    buttons: Vec<InteractiveButton>,
    headers: Vec<InteractiveHeader>,
    footer: Option<String>,
}

impl InteractiveMessageBuilder {
    fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Append a button
    #[must_use]
    pub fn button(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.buttons.push(InteractiveButton {
            id: id.into(),
            label: label.into(),
        });
        self
    }

    /// Set a text header (empty text is ignored)
    #[must_use]
    pub fn header_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.headers.push(InteractiveHeader::Text { text });
        }
        self
    }

    /// Set an image header from a URL or local path (empty locator is ignored)
    #[must_use]
    pub fn header_image(self, locator: &str) -> Self {
        self.header_media(MediaCategory::Image, locator)
    }

    /// Set a video header from a URL or local path (empty locator is ignored)
    #[must_use]
    pub fn header_video(self, locator: &str) -> Self {
        self.header_media(MediaCategory::Video, locator)
    }

    /// Set a document header from a URL or local path (empty locator is ignored)
    #[must_use]
    pub fn header_document(self, locator: &str) -> Self {
        self.header_media(MediaCategory::Document, locator)
    }

    /// Set a media header of an arbitrary category (empty locator is ignored)
    #[must_use]
    pub fn header_media(mut self, category: MediaCategory, locator: &str) -> Self {
        if !locator.trim().is_empty() {
            self.headers.push(InteractiveHeader::Media {
                category,
                source: MediaSource::parse(locator),
            });
        }
        self
    }

    /// Set the footer (empty text is ignored)
    #[must_use]
    pub fn footer(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.footer = (!text.trim().is_empty()).then_some(text);
        self
    }

    /// Validate and produce the message
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] listing every violated rule.
    pub fn build(self) -> Result<InteractiveMessage, DomainError> {
        let violations = self.violations();
        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        let Self {
            body,
            buttons,
            mut headers,
            footer,
        } = self;

        Ok(InteractiveMessage {
            body,
            buttons,
            header: headers.pop(),
            footer,
        })
    }

    fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let body_chars = self.body.chars().count();
        if self.body.trim().is_empty() {
            violations.push("body text must not be empty".to_string());
        } else if body_chars > MAX_BODY_CHARS {
            violations.push(format!(
                "body text must be at most {MAX_BODY_CHARS} characters (got {body_chars})"
            ));
        }

        if self.buttons.len() > MAX_BUTTONS {
            violations.push(format!(
                "at most {MAX_BUTTONS} buttons are allowed (got {})",
                self.buttons.len()
            ));
        }

        let mut seen = HashSet::new();
        for (index, button) in self.buttons.iter().enumerate() {
            let n = index + 1;
            if button.id.trim().is_empty() {
                violations.push(format!("button {n}: id must not be empty"));
            } else if !seen.insert(button.id.as_str()) {
                violations.push(format!("button {n}: duplicate id '{}'", button.id));
            }

            let label_chars = button.label.chars().count();
            if button.label.trim().is_empty() {
                violations.push(format!("button {n}: label must not be empty"));
            } else if label_chars > MAX_BUTTON_LABEL_CHARS {
                violations.push(format!(
                    "button {n}: label must be at most {MAX_BUTTON_LABEL_CHARS} characters (got {label_chars})"
                ));
            }
        }

        if self.headers.len() > 1 {
            violations.push(format!(
                "only one header may be set (got {})",
                self.headers.len()
            ));
        }

        for header in &self.headers {
            match header {
                InteractiveHeader::Text { text } => {
                    let chars = text.chars().count();
                    if chars > MAX_HEADER_TEXT_CHARS {
                        violations.push(format!(
                            "header text must be at most {MAX_HEADER_TEXT_CHARS} characters (got {chars})"
                        ));
                    }
                },
                InteractiveHeader::Media { category, .. } => {
                    if *category == MediaCategory::Audio {
                        violations.push("audio cannot be used as a message header".to_string());
                    }
                },
            }
        }

        if let Some(footer) = &self.footer {
            let chars = footer.chars().count();
            if chars > MAX_FOOTER_CHARS {
                violations.push(format!(
                    "footer must be at most {MAX_FOOTER_CHARS} characters (got {chars})"
                ));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_minimal_message() {
        let message = InteractiveMessage::builder("Pick one").build().unwrap();
        assert_eq!(message.body(), "Pick one");
        assert!(message.buttons().is_empty());
        assert!(message.header().is_none());
        assert!(message.footer().is_none());
    }

    #[test]
    fn builds_full_message() {
        let message = InteractiveMessage::builder("Confirm your order?")
            .button("yes", "Yes")
            .button("no", "No")
            .button("later", "Later")
            .header_text("Order #42")
            .footer("Reply within 24h")
            .build()
            .unwrap();

        assert_eq!(message.buttons().len(), 3);
        assert_eq!(
            message.header(),
            Some(&InteractiveHeader::Text {
                text: "Order #42".to_string()
            })
        );
        assert_eq!(message.footer(), Some("Reply within 24h"));
    }

    #[test]
    fn four_buttons_rejected() {
        let err = InteractiveMessage::builder("Body")
            .button("1", "One")
            .button("2", "Two")
            .button("3", "Three")
            .button("4", "Four")
            .build()
            .unwrap_err();
        assert_eq!(err.violations(), ["at most 3 buttons are allowed (got 4)"]);
    }

    #[test]
    fn all_violations_are_reported() {
        let err = InteractiveMessage::builder("  ")
            .button("a", "")
            .button("a", "Second")
            .header_text("Title")
            .header_image("https://example.com/a.png")
            .build()
            .unwrap_err();

        let violations = err.violations();
        assert_eq!(violations.len(), 4, "{violations:?}");
        assert!(violations.contains(&"body text must not be empty".to_string()));
        assert!(violations.contains(&"button 1: label must not be empty".to_string()));
        assert!(violations.contains(&"button 2: duplicate id 'a'".to_string()));
        assert!(violations.contains(&"only one header may be set (got 2)".to_string()));
    }

    #[test]
    fn length_limits() {
        let err = InteractiveMessage::builder("x".repeat(MAX_BODY_CHARS + 1))
            .button("id", "y".repeat(MAX_BUTTON_LABEL_CHARS + 1))
            .header_text("h".repeat(MAX_HEADER_TEXT_CHARS + 1))
            .footer("f".repeat(MAX_FOOTER_CHARS + 1))
            .build()
            .unwrap_err();
        assert_eq!(err.violations().len(), 4);
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        let label = "ü".repeat(MAX_BUTTON_LABEL_CHARS);
        assert!(
            InteractiveMessage::builder("Body")
                .button("id", label)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn empty_optional_parts_are_ignored() {
        let message = InteractiveMessage::builder("Body")
            .header_text("")
            .header_image("  ")
            .footer("")
            .build()
            .unwrap();
        assert!(message.header().is_none());
        assert!(message.footer().is_none());
    }

    #[test]
    fn media_source_classification() {
        assert_eq!(
            MediaSource::parse("https://cdn.example.com/x.png"),
            MediaSource::Url("https://cdn.example.com/x.png".to_string())
        );
        assert_eq!(
            MediaSource::parse("/tmp/x.png"),
            MediaSource::LocalPath("/tmp/x.png".to_string())
        );
    }

    #[test]
    fn local_header_media_is_exposed() {
        let message = InteractiveMessage::builder("Body")
            .header_document("/tmp/invoice.pdf")
            .build()
            .unwrap();
        assert_eq!(
            message.local_header_media(),
            Some(("/tmp/invoice.pdf", MediaCategory::Document))
        );

        let remote = InteractiveMessage::builder("Body")
            .header_image("https://example.com/a.png")
            .build()
            .unwrap();
        assert!(remote.local_header_media().is_none());
    }

    #[test]
    fn audio_header_rejected() {
        let err = InteractiveMessage::builder("Body")
            .header_media(MediaCategory::Audio, "https://example.com/a.ogg")
            .build()
            .unwrap_err();
        assert_eq!(err.violations(), ["audio cannot be used as a message header"]);
    }
}
