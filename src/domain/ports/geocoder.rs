//! Geocoder Port
//!
//! Defines the interface for turning free-text place names into coordinates.

use crate::domain::errors::GeocodeError;
use crate::domain::value_objects::Coordinate;
use async_trait::async_trait;

/// Forward geocoder backed by an external lookup service.
///
/// This is an outbound port. Implementations may use Nominatim,
/// a commercial provider, or a test double.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up the single best match for `query`.
    ///
    /// Returns `Ok(None)` when the service answered but found nothing,
    /// and `Err` when the service could not answer.
    async fn lookup(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError>;
}
