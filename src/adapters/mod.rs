//! Adapters Layer
//!
//! Inbound adapters drive the application (HTTP API); outbound adapters
//! implement the domain ports (geocoding service, caches, vendor store).

pub mod inbound;
pub mod outbound;
