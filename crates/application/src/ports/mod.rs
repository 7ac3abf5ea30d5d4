//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod whatsapp_gateway_port;

#[cfg(test)]
pub use whatsapp_gateway_port::MockWhatsAppGatewayPort;
pub use whatsapp_gateway_port::WhatsAppGatewayPort;
