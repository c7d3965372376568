//! Infrastructure Layer
//!
//! Cross-cutting concerns and infrastructure components.

pub mod cancellation;
pub mod throttle;

pub use cancellation::{shutdown_signal, CancelHandle};
pub use throttle::Throttle;
