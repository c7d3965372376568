//! Geocode Cache Port
//!
//! Defines the key-value store that remembers resolved locations.

use crate::domain::value_objects::Coordinate;

/// String-keyed store of resolved coordinates.
///
/// Entries never expire. Implementations must be safe to share between
/// tasks; the resolver holds them behind an `Arc`.
pub trait GeocodeCache: Send + Sync {
    /// Get the cached coordinate for a key.
    fn get(&self, key: &str) -> Option<Coordinate>;

    /// Store a coordinate, replacing any previous value.
    fn set(&self, key: &str, value: Coordinate);

    /// Number of cached locations.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
