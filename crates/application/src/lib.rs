//! Application layer - Use cases and orchestration
//!
//! Turns tool-level operations into sequences of provider calls: paging,
//! client-side filtering, context windows and media transfer. Infrastructure
//! adapters implement the ports defined here.

pub mod date_parser;
pub mod error;
pub mod ports;
pub mod services;

pub use date_parser::{Bound, parse_datetime, parse_range};
pub use error::{ApplicationError, ErrorKind};
pub use ports::*;
pub use services::*;
