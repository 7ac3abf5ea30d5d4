//! MCP presentation layer
//!
//! Exposes the Wati tools over the Model Context Protocol (JSON-RPC 2.0 on
//! stdio). The binary in `main.rs` wires configuration, logging and the
//! dispatcher together.

pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

pub use dispatcher::ToolDispatcher;
pub use error::{McpError, McpResult};
pub use server::{McpServer, SERVER_NAME};
pub use tools::{ToolName, catalogue};
