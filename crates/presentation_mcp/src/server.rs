//! MCP server loop
//!
//! Reads newline-delimited JSON-RPC requests and writes one response line per
//! request. Notifications get no response. The loop ends at end of input.

use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::{
    dispatcher::ToolDispatcher,
    error::{McpError, McpResult},
    protocol::{
        CallToolParams, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeResult,
        JsonRpcRequest, JsonRpcResponse, ListToolsResult, METHOD_NOT_FOUND, PARSE_ERROR,
        PROTOCOL_VERSION, ServerCapabilities, ServerInfo, ToolsCapability,
    },
    tools::catalogue,
};

/// Name reported in `initialize`
pub const SERVER_NAME: &str = "wati-mcp";

/// Tool-only MCP server
#[derive(Debug)]
pub struct McpServer {
    dispatcher: ToolDispatcher,
    name: String,
    version: String,
}

impl McpServer {
    /// Create a server around a dispatcher
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            dispatcher,
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serve on stdin/stdout until stdin closes
    pub async fn serve_stdio(&self) -> McpResult<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Serve on arbitrary streams until the reader is exhausted
    ///
    /// Only I/O failures end the loop early.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(name = %self.name, version = %self.version, "MCP server listening on stdio");

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line).await,
                Err(e) => {
                    warn!(error = %e, "Input line is not UTF-8");
                    Some(JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("Parse error: {e}"),
                    ))
                },
            };

            if let Some(response) = response {
                let mut encoded = serde_json::to_vec(&response)?;
                encoded.push(b'\n');
                writer.write_all(&encoded).await?;
                writer.flush().await?;
            }
        }

        info!("Input closed, MCP server stopping");
        Ok(())
    }

    /// Handle one raw input line
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparseable input line");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            },
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Invalid request: {e}"),
            )),
        }
    }

    /// Handle a decoded request; `None` for notifications
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, id = ?request.id, "Handling MCP request");

        let Some(id) = request.id else {
            match request.method.as_str() {
                "notifications/initialized" => debug!("Client finished initialization"),
                other => debug!(method = %other, "Ignoring notification"),
            }
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => Self::handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            other => {
                debug!(method = %other, "Unknown method");
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, "Method not found")
            },
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        info!(name = %self.name, version = %self.version, "Initializing MCP session");

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.name.clone(),
                version: self.version.clone(),
            },
        };
        encode(id, &result)
    }

    fn handle_list_tools(id: Value) -> JsonRpcResponse {
        encode(id, &ListToolsResult { tools: catalogue() })
    }

    async fn handle_call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"));
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        match self.dispatcher.call(&params.name, params.arguments).await {
            Ok(result) => encode(id, &result),
            Err(e @ McpError::UnknownTool(_)) => {
                JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string())
            },
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }
}

fn encode<T: serde::Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
    }
}
