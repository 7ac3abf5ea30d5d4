//! Logging setup
//!
//! All log output goes to stderr; stdout belongs to the MCP protocol stream.

mod logging;

pub use logging::{TelemetryError, filter_directive, init_logging};
