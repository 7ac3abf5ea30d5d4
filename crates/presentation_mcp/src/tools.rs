//! Tool catalogue
//!
//! Names, descriptions, argument schemas and the typed argument structs the
//! dispatcher decodes `tools/call` arguments into.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use serde_json::{Value, json};

use crate::{error::McpError, protocol::McpTool};

/// Default number of messages or chats returned by listing tools
const DEFAULT_LIMIT: u32 = 20;

/// Default context window on either side of the target message
const DEFAULT_CONTEXT: usize = 5;

/// Every tool exposed by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    SearchContacts,
    ListMessages,
    ListChats,
    GetChat,
    GetDirectChatByContact,
    GetContactChats,
    GetLastInteraction,
    GetMessageContext,
    SendMessage,
    SendFile,
    SendAudioMessage,
    DownloadMedia,
    SendInteractiveButtons,
}

impl ToolName {
    /// All tools, in catalogue order
    pub const ALL: [Self; 13] = [
        Self::SearchContacts,
        Self::ListMessages,
        Self::ListChats,
        Self::GetChat,
        Self::GetDirectChatByContact,
        Self::GetContactChats,
        Self::GetLastInteraction,
        Self::GetMessageContext,
        Self::SendMessage,
        Self::SendFile,
        Self::SendAudioMessage,
        Self::DownloadMedia,
        Self::SendInteractiveButtons,
    ];

    /// Wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchContacts => "search_contacts",
            Self::ListMessages => "list_messages",
            Self::ListChats => "list_chats",
            Self::GetChat => "get_chat",
            Self::GetDirectChatByContact => "get_direct_chat_by_contact",
            Self::GetContactChats => "get_contact_chats",
            Self::GetLastInteraction => "get_last_interaction",
            Self::GetMessageContext => "get_message_context",
            Self::SendMessage => "send_message",
            Self::SendFile => "send_file",
            Self::SendAudioMessage => "send_audio_message",
            Self::DownloadMedia => "download_media",
            Self::SendInteractiveButtons => "send_interactive_buttons",
        }
    }

    /// Whether the tool sends something to a recipient
    pub const fn is_send(self) -> bool {
        matches!(
            self,
            Self::SendMessage
                | Self::SendFile
                | Self::SendAudioMessage
                | Self::SendInteractiveButtons
        )
    }

    const fn description(self) -> &'static str {
        match self {
            Self::SearchContacts => {
                "Search WhatsApp contacts by name or phone number (case-insensitive substring). \
                 Returns every available contact field, including custom parameters."
            },
            Self::ListMessages => {
                "List messages of one chat, newest first, with optional date range and \
                 content filters. Dates are ISO-8601; plain dates cover the whole day."
            },
            Self::ListChats => {
                "List chats (one per contact), optionally filtered by name or WAID and \
                 sorted by last activity or name."
            },
            Self::GetChat => "Get the chat with a contact by its WhatsApp ID (WAID).",
            Self::GetDirectChatByContact => "Get the direct chat with a contact by phone number.",
            Self::GetContactChats => {
                "List all chats involving a contact. Empty when the contact is unknown."
            },
            Self::GetLastInteraction => {
                "Get the most recent message exchanged with a contact, with a one-line summary."
            },
            Self::GetMessageContext => {
                "Get the messages around a specific message, in chronological order."
            },
            Self::SendMessage => {
                "Send a WhatsApp text message. The recipient is a phone number with country \
                 code and no symbols, e.g. 85264318721."
            },
            Self::SendFile => {
                "Send a local file or an http(s) URL (image, video, document or audio) with an \
                 optional caption. The category is inferred from the extension when omitted."
            },
            Self::SendAudioMessage => "Send a local or http(s) audio file as an audio message.",
            Self::DownloadMedia => {
                "Download the media of a message (or a provider media filename) into the \
                 scratch directory and return the absolute local path."
            },
            Self::SendInteractiveButtons => {
                "Send an interactive message with up to 3 reply buttons and an optional \
                 text or media header and footer."
            },
        }
    }

    fn input_schema(self) -> Value {
        let recipient = json!({
            "type": "string",
            "description": "Recipient phone number with country code, digits only"
        });
        let waid = json!({
            "type": "string",
            "description": "WhatsApp ID (phone number with country code)"
        });
        let limit = json!({
            "type": "integer",
            "minimum": 0,
            "default": DEFAULT_LIMIT,
            "description": "Maximum number of results"
        });
        let page = json!({
            "type": "integer",
            "minimum": 0,
            "default": 0,
            "description": "Zero-based page number"
        });

        match self {
            Self::SearchContacts => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search term" }
                },
                "required": ["query"]
            }),
            Self::ListMessages => json!({
                "type": "object",
                "properties": {
                    "chat_waid": waid,
                    "sender_phone_number": {
                        "type": "string",
                        "description": "Phone number of the contact; alternative to chat_waid"
                    },
                    "after": { "type": "string", "description": "Only messages at or after this ISO-8601 time" },
                    "before": { "type": "string", "description": "Only messages at or before this ISO-8601 time" },
                    "query": { "type": "string", "description": "Case-insensitive text filter" },
                    "limit": limit,
                    "page": page
                }
            }),
            Self::ListChats => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Filter by name or WAID" },
                    "limit": limit,
                    "page": page,
                    "include_last_message": { "type": "boolean", "default": true },
                    "sort_by": {
                        "type": "string",
                        "enum": ["last_active", "name"],
                        "default": "last_active"
                    }
                }
            }),
            Self::GetChat => json!({
                "type": "object",
                "properties": {
                    "chat_waid": waid,
                    "include_last_message": { "type": "boolean", "default": true }
                },
                "required": ["chat_waid"]
            }),
            Self::GetDirectChatByContact => json!({
                "type": "object",
                "properties": {
                    "sender_phone_number": { "type": "string", "description": "Phone number to look up" }
                },
                "required": ["sender_phone_number"]
            }),
            Self::GetContactChats => json!({
                "type": "object",
                "properties": { "waid": waid, "limit": limit, "page": page },
                "required": ["waid"]
            }),
            Self::GetLastInteraction => json!({
                "type": "object",
                "properties": { "waid": waid },
                "required": ["waid"]
            }),
            Self::GetMessageContext => json!({
                "type": "object",
                "properties": {
                    "message_id": { "type": "string" },
                    "before": { "type": "integer", "minimum": 0, "default": DEFAULT_CONTEXT },
                    "after": { "type": "integer", "minimum": 0, "default": DEFAULT_CONTEXT },
                    "chat_waid": {
                        "type": "string",
                        "description": "Chat containing the message; recent chats are searched when omitted"
                    }
                },
                "required": ["message_id"]
            }),
            Self::SendMessage => json!({
                "type": "object",
                "properties": {
                    "recipient": recipient,
                    "message": { "type": "string", "description": "Message text" }
                },
                "required": ["recipient", "message"]
            }),
            Self::SendFile => json!({
                "type": "object",
                "properties": {
                    "recipient": recipient,
                    "media_path": { "type": "string", "description": "Absolute path of a local file or an http(s) URL" },
                    "category": {
                        "type": "string",
                        "enum": ["image", "video", "document", "audio"]
                    },
                    "caption": { "type": "string" }
                },
                "required": ["recipient", "media_path"]
            }),
            Self::SendAudioMessage => json!({
                "type": "object",
                "properties": {
                    "recipient": recipient,
                    "media_path": { "type": "string", "description": "Absolute path of a local audio file or an http(s) URL" }
                },
                "required": ["recipient", "media_path"]
            }),
            Self::DownloadMedia => json!({
                "type": "object",
                "properties": {
                    "message_id": {
                        "type": "string",
                        "description": "Message ID, or the provider media filename"
                    },
                    "chat_waid": {
                        "type": "string",
                        "description": "Chat containing the message; needed to resolve a message ID"
                    }
                },
                "required": ["message_id"]
            }),
            Self::SendInteractiveButtons => json!({
                "type": "object",
                "properties": {
                    "recipient": recipient,
                    "body_text": { "type": "string", "maxLength": 1024 },
                    "buttons": {
                        "type": "array",
                        "maxItems": 3,
                        "items": {
                            "type": "object",
                            "properties": {
                                "text": { "type": "string", "maxLength": 20 },
                                "id": { "type": "string", "description": "Defaults to the text" }
                            },
                            "required": ["text"]
                        }
                    },
                    "header_text": { "type": "string", "maxLength": 60 },
                    "header_image": { "type": "string", "description": "URL or local path" },
                    "header_video": { "type": "string", "description": "URL or local path" },
                    "header_document": { "type": "string", "description": "URL or local path" },
                    "footer_text": { "type": "string", "maxLength": 60 }
                },
                "required": ["recipient", "body_text", "buttons"]
            }),
        }
    }

    /// Definition advertised by `tools/list`
    pub fn definition(self) -> McpTool {
        McpTool {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = McpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| McpError::UnknownTool(s.to_string()))
    }
}

/// All tool definitions
pub fn catalogue() -> Vec<McpTool> {
    ToolName::ALL.into_iter().map(ToolName::definition).collect()
}

// ============================================================================
// Arguments
// ============================================================================

const fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

const fn default_context() -> usize {
    DEFAULT_CONTEXT
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SearchContactsArgs {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesArgs {
    pub chat_waid: Option<String>,
    pub sender_phone_number: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub query: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct ListChatsArgs {
    pub query: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_true")]
    pub include_last_message: bool,
    pub sort_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetChatArgs {
    pub chat_waid: String,
    #[serde(default = "default_true")]
    pub include_last_message: bool,
}

#[derive(Debug, Deserialize)]
pub struct DirectChatArgs {
    pub sender_phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactChatsArgs {
    pub waid: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct LastInteractionArgs {
    pub waid: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageContextArgs {
    pub message_id: String,
    #[serde(default = "default_context")]
    pub before: usize,
    #[serde(default = "default_context")]
    pub after: usize,
    pub chat_waid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageArgs {
    pub recipient: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SendFileArgs {
    pub recipient: String,
    pub media_path: String,
    pub category: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendAudioArgs {
    pub recipient: String,
    pub media_path: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadMediaArgs {
    pub message_id: String,
    pub chat_waid: Option<String>,
}

/// Reply button as given by the caller
#[derive(Debug, Deserialize)]
pub struct ButtonArg {
    pub text: String,
    /// Falls back to `text`
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InteractiveButtonsArgs {
    pub recipient: String,
    pub body_text: String,
    #[serde(default)]
    pub buttons: Vec<ButtonArg>,
    pub header_text: Option<String>,
    pub header_image: Option<String>,
    pub header_video: Option<String>,
    pub header_document: Option<String>,
    pub footer_text: Option<String>,
}
