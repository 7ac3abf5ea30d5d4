//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod wati_gateway_adapter;

pub use wati_gateway_adapter::WatiGatewayAdapter;
