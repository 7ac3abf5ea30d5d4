//! Tool dispatcher
//!
//! Decodes tool arguments, runs the matching application service and shapes
//! the outcome into a tool result. Every service failure is caught here and
//! rendered as `{ "success": false, "error": { kind, message } }`.

use std::{fmt, path::PathBuf, str::FromStr, sync::Arc};

use application::{
    ApplicationError, ChatFilter, ChatService, ContactService, MediaService, MessageFilter,
    MessageService, OutboundService, PaginationPolicy, WhatsAppGatewayPort, parse_range,
};
use domain::{ChatSort, DeliveryReceipt, InteractiveMessage, MediaCategory, WhatsAppId};
use infrastructure::{AppConfig, WatiGatewayAdapter};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::{
    error::McpError,
    protocol::ToolCallResult,
    tools::{
        ContactChatsArgs, DirectChatArgs, DownloadMediaArgs, GetChatArgs, InteractiveButtonsArgs,
        LastInteractionArgs, ListChatsArgs, ListMessagesArgs, MessageContextArgs,
        SearchContactsArgs, SendAudioArgs, SendFileArgs, SendMessageArgs, ToolName,
    },
};

/// Structured failure body
#[derive(Debug, Serialize)]
struct FailureBody<'a> {
    success: bool,
    error: FailureDetail<'a>,
}

#[derive(Debug, Serialize)]
struct FailureDetail<'a> {
    kind: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_secs: Option<u64>,
}

/// Routes tool calls to the application services
pub struct ToolDispatcher {
    contacts: ContactService,
    chats: ChatService,
    messages: MessageService,
    media: MediaService,
    outbound: OutboundService,
}

impl fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDispatcher")
            .field("scratch_dir", &self.media.scratch_dir())
            .finish_non_exhaustive()
    }
}

impl ToolDispatcher {
    /// Wire every service onto one gateway
    pub fn new(
        gateway: Arc<dyn WhatsAppGatewayPort>,
        policy: PaginationPolicy,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            contacts: ContactService::new(Arc::clone(&gateway), policy),
            chats: ChatService::new(Arc::clone(&gateway), policy),
            messages: MessageService::new(Arc::clone(&gateway), policy),
            media: MediaService::new(Arc::clone(&gateway), policy, scratch_dir),
            outbound: OutboundService::new(gateway),
        }
    }

    /// Build the dispatcher on top of the Wati adapter
    pub fn from_config(config: &AppConfig) -> Result<Self, ApplicationError> {
        let adapter = WatiGatewayAdapter::new(config.wati_client_config())?;
        Ok(Self::new(
            Arc::new(adapter),
            config.pagination.into(),
            config.media.scratch_dir.clone(),
        ))
    }

    /// Run a tool
    ///
    /// Only an unknown tool name is an error; every tool failure is returned
    /// as a result with `is_error` set.
    #[instrument(skip(self, name, arguments), fields(tool = %name))]
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolCallResult, McpError> {
        let tool = ToolName::from_str(name)?;
        let arguments = arguments.unwrap_or_else(|| json!({}));

        match self.execute(tool, arguments).await {
            Ok(value) => {
                info!("Tool call succeeded");
                Ok(render_success(&value))
            },
            Err(err) => {
                warn!(kind = %err.kind(), error = %err, "Tool call failed");
                Ok(render_failure(&err))
            },
        }
    }

    async fn execute(&self, tool: ToolName, arguments: Value) -> Result<Value, ApplicationError> {
        match tool {
            ToolName::SearchContacts => {
                let args: SearchContactsArgs = parse_args(arguments)?;
                to_json(&self.contacts.search_contacts(&args.query).await?)
            },
            ToolName::ListMessages => {
                let args: ListMessagesArgs = parse_args(arguments)?;
                let filter = message_filter(args)?;
                to_json(&self.messages.list_messages(&filter).await?)
            },
            ToolName::ListChats => {
                let args: ListChatsArgs = parse_args(arguments)?;
                let sort_by = match args.sort_by.as_deref() {
                    Some(value) => ChatSort::from_str(value).map_err(ApplicationError::validation)?,
                    None => ChatSort::default(),
                };
                let filter = ChatFilter {
                    query: args.query,
                    limit: args.limit,
                    page: args.page,
                    include_last_message: args.include_last_message,
                    sort_by,
                };
                to_json(&self.chats.list_chats(&filter).await?)
            },
            ToolName::GetChat => {
                let args: GetChatArgs = parse_args(arguments)?;
                let chat = waid(&args.chat_waid)?;
                to_json(&self.chats.get_chat(&chat, args.include_last_message).await?)
            },
            ToolName::GetDirectChatByContact => {
                let args: DirectChatArgs = parse_args(arguments)?;
                let contact = waid(&args.sender_phone_number)?;
                to_json(&self.chats.get_direct_chat_by_contact(&contact).await?)
            },
            ToolName::GetContactChats => {
                let args: ContactChatsArgs = parse_args(arguments)?;
                let contact = waid(&args.waid)?;
                let chats: Vec<_> = self
                    .chats
                    .get_contact_chats(&contact)
                    .await?
                    .into_iter()
                    .skip(args.page.saturating_mul(args.limit) as usize)
                    .take(args.limit as usize)
                    .collect();
                to_json(&chats)
            },
            ToolName::GetLastInteraction => {
                let args: LastInteractionArgs = parse_args(arguments)?;
                let contact = waid(&args.waid)?;
                let message = self.messages.get_last_interaction(&contact).await?;
                Ok(json!({
                    "summary": message.summary_line(),
                    "message": to_json(&message)?,
                }))
            },
            ToolName::GetMessageContext => {
                let args: MessageContextArgs = parse_args(arguments)?;
                let chat = args.chat_waid.as_deref().map(waid).transpose()?;
                let window = self
                    .messages
                    .get_message_context(&args.message_id, args.before, args.after, chat.as_ref())
                    .await?;
                to_json(&window)
            },
            ToolName::SendMessage => {
                let args: SendMessageArgs = parse_args(arguments)?;
                let recipient = waid(&args.recipient)?;
                let receipt = self.outbound.send_message(&recipient, &args.message).await?;
                Ok(delivery_result(&recipient, receipt))
            },
            ToolName::SendFile => {
                let args: SendFileArgs = parse_args(arguments)?;
                let category = args
                    .category
                    .as_deref()
                    .filter(|c| !c.trim().is_empty())
                    .map(MediaCategory::from_str)
                    .transpose()?;
                let recipient = waid(&args.recipient)?;
                let receipt = self
                    .media
                    .send_file(&recipient, &args.media_path, category, args.caption)
                    .await?;
                Ok(delivery_result(&recipient, receipt))
            },
            ToolName::SendAudioMessage => {
                let args: SendAudioArgs = parse_args(arguments)?;
                let recipient = waid(&args.recipient)?;
                let receipt = self
                    .media
                    .send_audio_message(&recipient, &args.media_path)
                    .await?;
                Ok(delivery_result(&recipient, receipt))
            },
            ToolName::DownloadMedia => {
                let args: DownloadMediaArgs = parse_args(arguments)?;
                let chat = args.chat_waid.as_deref().map(waid).transpose()?;
                let path = self
                    .media
                    .download_media(&args.message_id, chat.as_ref())
                    .await?;
                Ok(json!({
                    "success": true,
                    "message": "Media downloaded",
                    "file_path": path.display().to_string(),
                }))
            },
            ToolName::SendInteractiveButtons => {
                let args: InteractiveButtonsArgs = parse_args(arguments)?;
                let recipient = waid(&args.recipient)?;
                let message = interactive_message(args)?;
                let receipt = self.outbound.send_interactive(&recipient, &message).await?;
                Ok(delivery_result(&recipient, receipt))
            },
        }
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ApplicationError> {
    serde_json::from_value(arguments)
        .map_err(|e| ApplicationError::validation(format!("invalid arguments: {e}")))
}

fn waid(value: &str) -> Result<WhatsAppId, ApplicationError> {
    Ok(WhatsAppId::new(value)?)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApplicationError> {
    serde_json::to_value(value).map_err(|e| ApplicationError::Internal(e.to_string()))
}

fn message_filter(args: ListMessagesArgs) -> Result<MessageFilter, ApplicationError> {
    let chat = match (args.chat_waid.as_deref(), args.sender_phone_number.as_deref()) {
        (Some(chat), Some(sender)) => {
            let chat = waid(chat)?;
            if chat != waid(sender)? {
                return Err(ApplicationError::validation(
                    "chat_waid and sender_phone_number refer to different chats",
                ));
            }
            chat
        },
        (Some(id), None) | (None, Some(id)) => waid(id)?,
        (None, None) => {
            return Err(ApplicationError::validation(
                "chat_waid or sender_phone_number is required",
            ));
        },
    };

    let (after, before) = parse_range(args.after.as_deref(), args.before.as_deref())?;
    Ok(MessageFilter {
        after,
        before,
        query: args.query.filter(|q| !q.trim().is_empty()),
        limit: args.limit,
        page: args.page,
        ..MessageFilter::for_chat(chat)
    })
}

fn interactive_message(args: InteractiveButtonsArgs) -> Result<InteractiveMessage, ApplicationError> {
    let mut builder = InteractiveMessage::builder(args.body_text);
    for button in args.buttons {
        let id = button.id.unwrap_or_else(|| button.text.clone());
        builder = builder.button(id, button.text);
    }
    if let Some(text) = args.header_text {
        builder = builder.header_text(text);
    }
    if let Some(locator) = &args.header_image {
        builder = builder.header_image(locator);
    }
    if let Some(locator) = &args.header_video {
        builder = builder.header_video(locator);
    }
    if let Some(locator) = &args.header_document {
        builder = builder.header_document(locator);
    }
    if let Some(text) = args.footer_text {
        builder = builder.footer(text);
    }
    Ok(builder.build()?)
}

fn delivery_result(recipient: &WhatsAppId, receipt: DeliveryReceipt) -> Value {
    let message = receipt.message.unwrap_or_else(|| {
        if receipt.accepted {
            format!("Message sent to {recipient}")
        } else {
            format!("Message to {recipient} was not accepted")
        }
    });
    json!({ "success": receipt.accepted, "message": message })
}

fn render_success(value: &Value) -> ToolCallResult {
    match serde_json::to_string_pretty(value) {
        Ok(text) => ToolCallResult::text(text, false),
        Err(e) => render_failure(&ApplicationError::Internal(e.to_string())),
    }
}

fn render_failure(err: &ApplicationError) -> ToolCallResult {
    let body = FailureBody {
        success: false,
        error: FailureDetail {
            kind: err.kind().as_str(),
            message: err.to_string(),
            retry_after_secs: err.retry_after_secs(),
        },
    };
    let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| {
        format!(
            r#"{{"success":false,"error":{{"kind":"{}"}}}}"#,
            err.kind().as_str()
        )
    });
    ToolCallResult::text(text, true)
}
