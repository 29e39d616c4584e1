//! HTTP adapter for the Marvel-style catalog gateway.
//!
//! Implements [`longbox_core::ports::CatalogSource`] over the gateway's
//! public REST surface, including its timestamp/hash request signing.

mod client;

pub use client::{DEFAULT_BASE_URL, GatewayClient, GatewayConfig};
