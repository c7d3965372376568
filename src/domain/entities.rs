//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the vendor directory.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::Coordinate;
use serde::{Deserialize, Serialize};

/// Anything that may sit at a known point on the map.
pub trait Locatable {
    /// The entity's position, or None if it has no usable coordinates.
    fn coordinate(&self) -> Option<Coordinate>;
}

/// A directory listing for a funeral service provider.
///
/// Vendors are owned by the directory store; search only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    /// Unique identifier for this vendor
    pub id: String,
    /// Display name
    pub name: String,
    /// Service category (funeral home, florist, celebrant, ...)
    pub category: String,
    /// Free-text city shown on the listing
    #[serde(default)]
    pub city: Option<String>,
    /// Latitude in degrees, if the vendor has been geocoded
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude in degrees, if the vendor has been geocoded
    #[serde(default)]
    pub lng: Option<f64>,
    /// Whether moderation has approved the listing
    #[serde(default)]
    pub approved: bool,
}

impl Vendor {
    /// Case-insensitive category match.
    pub fn in_category(&self, category: &str) -> bool {
        self.category.eq_ignore_ascii_case(category.trim())
    }
}

impl Locatable for Vendor {
    fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_optional(self.lat, self.lng)
    }
}

/// Outcome of a proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityResult<T> {
    /// Entities within `radius_used_km`, in input order
    pub matches: Vec<T>,
    /// The tier that produced the matches, or the largest tier tried
    pub radius_used_km: u32,
}

impl<T> ProximityResult<T> {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
