//! Location Resolver - Geocoding use case
//!
//! Turns free-text place names into coordinates, consulting the injected
//! cache before calling the external geocoder.

use crate::domain::errors::ResolveError;
use crate::domain::ports::{GeocodeCache, Geocoder};
use crate::domain::value_objects::{Coordinate, KeyNormalization};
use crate::infrastructure::CancelHandle;
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound on a single outbound lookup.
pub const DEFAULT_LOOKUP_DEADLINE: Duration = Duration::from_secs(10);

/// Location resolver.
///
/// 1. Rejects blank input without touching the cache or the network
/// 2. Serves cache hits without awaiting anything
/// 3. On a miss, performs exactly one bounded lookup and caches a match
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    cache: Arc<dyn GeocodeCache>,
    normalization: KeyNormalization,
    deadline: Duration,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, cache: Arc<dyn GeocodeCache>) -> Self {
        Self {
            geocoder,
            cache,
            normalization: KeyNormalization::default(),
            deadline: DEFAULT_LOOKUP_DEADLINE,
        }
    }

    /// Set how location text maps to cache keys.
    pub fn with_normalization(mut self, normalization: KeyNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Set the upper bound on a single outbound lookup.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn normalization(&self) -> KeyNormalization {
        self.normalization
    }

    /// Number of locations currently cached.
    pub fn cached_locations(&self) -> usize {
        self.cache.len()
    }

    /// Resolve `text` to a coordinate.
    pub async fn resolve(&self, text: &str) -> Result<Coordinate, ResolveError> {
        self.resolve_inner(text, None).await
    }

    /// Resolve `text`, giving up with `Cancelled` as soon as `cancel` fires.
    pub async fn resolve_with_cancel(
        &self,
        text: &str,
        cancel: &CancelHandle,
    ) -> Result<Coordinate, ResolveError> {
        self.resolve_inner(text, Some(cancel)).await
    }

    async fn resolve_inner(
        &self,
        text: &str,
        cancel: Option<&CancelHandle>,
    ) -> Result<Coordinate, ResolveError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(ResolveError::EmptyInput);
        }

        let key = self.normalization.apply(text);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("geocode cache hit for {:?} -> {}", key, hit);
            return Ok(hit);
        }

        tracing::debug!("geocode cache miss for {:?}", key);

        if cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(ResolveError::Cancelled);
        }

        let found = self.lookup(query, cancel).await.map_err(|e| {
            if e.is_transient() {
                tracing::warn!("geocoding {:?} failed: {}", query, e);
            }
            e
        })?;

        match found {
            Some(coordinate) => {
                self.cache.set(&key, coordinate);
                tracing::debug!("geocoded {:?} -> {}", query, coordinate);
                Ok(coordinate)
            }
            None => {
                tracing::debug!("no geocoding match for {:?}", query);
                Err(ResolveError::NoMatch)
            }
        }
    }

    /// One outbound lookup, bounded by the deadline and the cancel handle.
    async fn lookup(
        &self,
        query: &str,
        cancel: Option<&CancelHandle>,
    ) -> Result<Option<Coordinate>, ResolveError> {
        let bounded = tokio::time::timeout(self.deadline, self.geocoder.lookup(query));

        let outcome = match cancel {
            Some(cancel) => {
                tokio::select! {
                    outcome = bounded => outcome,
                    _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
                }
            }
            None => bounded.await,
        };

        match outcome {
            Ok(result) => Ok(result?),
            Err(_) => Err(ResolveError::Timeout(self.deadline)),
        }
    }
}
