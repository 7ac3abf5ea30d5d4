//! Wati integration
//!
//! HTTP client for the Wati WhatsApp Business REST API, the normalizer that
//! turns its JSON into domain entities, and send payload serialization.

mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod payload;

pub use client::{Query, WatiClient};
pub use config::WatiClientConfig;
pub use error::WatiError;
