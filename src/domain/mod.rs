//! Domain Layer
//!
//! Entities, value objects, ports and pure services. Nothing in here
//! performs I/O.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{Locatable, ProximityResult, Vendor};
pub use errors::{GeocodeError, InvalidCoordinate, InvalidRadiusTiers, ResolveError};
pub use value_objects::{Coordinate, KeyNormalization, RadiusTiers};
