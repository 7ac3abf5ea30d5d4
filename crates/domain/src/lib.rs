//! Domain layer for the Wati MCP server
//!
//! Contains the entities the tools operate on, value objects, interactive
//! message validation and domain errors. No I/O happens in this crate.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
