//! DashMap Geocode Cache
//!
//! Implements GeocodeCache using DashMap for lock-free concurrent access.

use crate::domain::ports::GeocodeCache;
use crate::domain::value_objects::Coordinate;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory, process-wide geocode cache.
///
/// Entries live as long as the process. Nothing is ever evicted.
#[derive(Clone, Default)]
pub struct DashMapGeocodeCache {
    entries: Arc<DashMap<String, Coordinate>>,
}

impl DashMapGeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the cache, e.g. from a persistent store.
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Coordinate)>,
    {
        let cache = Self::new();
        for (key, value) in entries {
            cache.entries.insert(key, value);
        }
        cache
    }
}

impl GeocodeCache for DashMapGeocodeCache {
    fn get(&self, key: &str) -> Option<Coordinate> {
        self.entries.get(key).map(|e| *e.value())
    }

    fn set(&self, key: &str, value: Coordinate) {
        self.entries.insert(key.to_string(), value);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
