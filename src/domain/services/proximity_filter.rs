//! Proximity Filter Service
//!
//! Pure domain logic for finding entities near a point.
//! This service has NO external dependencies - it's pure Rust.

use crate::domain::entities::{Locatable, ProximityResult};
use crate::domain::value_objects::{Coordinate, RadiusTiers};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Proximity filter with progressive radius widening.
///
/// Tiers are tried smallest first. The first tier that contains at
/// least one entity wins; if none does, the result is empty and reports
/// the largest tier.
pub struct ProximityFilter;

impl ProximityFilter {
    /// Great-circle distance between two points, in kilometers.
    pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
        let lat1 = from.latitude().to_radians();
        let lat2 = to.latitude().to_radians();
        let d_lat = (to.latitude() - from.latitude()).to_radians();
        let d_lng = (to.longitude() - from.longitude()).to_radians();

        let a = ((d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2))
        .clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Distance from `center` to an entity, if the entity is locatable.
    pub fn distance_to<T: Locatable>(center: Coordinate, entity: &T) -> Option<f64> {
        entity.coordinate().map(|c| Self::haversine_km(center, c))
    }

    /// Entities within `radius_km` of `center` (boundary inclusive).
    ///
    /// Entities without coordinates are always excluded. Input order
    /// is preserved.
    pub fn within_radius<T>(entities: &[T], center: Coordinate, radius_km: u32) -> Vec<T>
    where
        T: Locatable + Clone,
    {
        entities
            .iter()
            .filter(|e| {
                Self::distance_to(center, *e).is_some_and(|d| Self::in_range(d, radius_km))
            })
            .cloned()
            .collect()
    }

    /// Whether a distance falls inside a radius; the boundary counts as inside.
    pub fn in_range(distance_km: f64, radius_km: u32) -> bool {
        distance_km <= radius_km as f64
    }

    /// Filter entities by proximity, widening through `tiers` until
    /// something matches.
    ///
    /// # Example
    /// ```ignore
    /// let result = ProximityFilter::filter_by_proximity(
    ///     &vendors,
    ///     center,
    ///     &RadiusTiers::fallback(),
    /// );
    /// println!("{} vendors within {} km", result.matches.len(), result.radius_used_km);
    /// ```
    pub fn filter_by_proximity<T>(
        entities: &[T],
        center: Coordinate,
        tiers: &RadiusTiers,
    ) -> ProximityResult<T>
    where
        T: Locatable + Clone,
    {
        for &tier in tiers.as_slice() {
            let matches = Self::within_radius(entities, center, tier);
            if !matches.is_empty() {
                return ProximityResult {
                    matches,
                    radius_used_km: tier,
                };
            }
        }

        ProximityResult {
            matches: Vec::new(),
            radius_used_km: tiers.largest(),
        }
    }
}
