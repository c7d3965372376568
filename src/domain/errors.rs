//! Domain Errors
//!
//! Error types shared by the domain, application and adapter layers.

use std::time::Duration;

/// A latitude/longitude pair that is out of range or not finite.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate (lat={latitude}, lng={longitude})")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Rejected radius tier sequences.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRadiusTiers {
    #[error("radius tiers must not be empty")]
    Empty,
    #[error("radius tier must be a positive number of kilometers")]
    NonPositive,
    #[error("radius tiers must be strictly increasing ({previous} then {next})")]
    NotIncreasing { previous: u32, next: u32 },
    #[error("invalid radius tier {0:?}")]
    Parse(String),
}

/// Failure talking to the external geocoding service.
///
/// Distinct from "no match": the service could not give an answer at all.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Transport(String),
    #[error("geocoding service returned status {status}")]
    Status { status: u16 },
    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}

/// Why a location could not be resolved to a coordinate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// Blank location text; nothing was looked up.
    #[error("location text is empty")]
    EmptyInput,
    /// The service answered but knows no such place.
    #[error("location not found")]
    NoMatch,
    #[error(transparent)]
    Service(#[from] GeocodeError),
    #[error("geocoding timed out after {0:?}")]
    Timeout(Duration),
    #[error("geocoding was cancelled")]
    Cancelled,
}

impl ResolveError {
    /// The place does not exist (or nothing was asked).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::NoMatch)
    }

    /// The lookup failed for reasons unrelated to the place itself;
    /// retrying later may succeed.
    pub fn is_transient(&self) -> bool {
        !self.is_not_found()
    }
}
