//! MCP server errors
//!
//! Tool failures never surface here; they become structured tool results.

use thiserror::Error;

/// Errors of the protocol layer
#[derive(Debug, Error)]
pub enum McpError {
    /// `tools/call` named a tool that does not exist
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Request parameters could not be decoded
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Reading stdin or writing stdout failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization of a response failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for protocol operations
pub type McpResult<T> = Result<T, McpError>;
