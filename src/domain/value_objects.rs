//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use crate::domain::errors::{InvalidCoordinate, InvalidRadiusTiers};
use serde::Serialize;
use std::str::FromStr;

/// A point on the Earth's surface, in degrees.
///
/// Only constructible through [`Coordinate::new`], so every value in
/// circulation is within range and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Validate and build a coordinate.
    ///
    /// # Examples
    /// ```
    /// use vendor_locator::Coordinate;
    ///
    /// assert!(Coordinate::new(40.7128, -74.0060).is_ok());
    /// assert!(Coordinate::new(91.0, 0.0).is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    /// Build a coordinate from an optional pair, as stored on directory rows.
    ///
    /// Returns None if either half is missing or the pair is invalid.
    pub fn from_optional(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        Self::new(latitude?, longitude?).ok()
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Ordered search radii in kilometers, tried smallest first.
///
/// Non-empty, every tier positive, strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadiusTiers(Vec<u32>);

impl RadiusTiers {
    pub fn new(tiers: Vec<u32>) -> Result<Self, InvalidRadiusTiers> {
        if tiers.is_empty() {
            return Err(InvalidRadiusTiers::Empty);
        }
        if tiers.iter().any(|&t| t == 0) {
            return Err(InvalidRadiusTiers::NonPositive);
        }
        if let Some(pair) = tiers.windows(2).find(|w| w[0] >= w[1]) {
            return Err(InvalidRadiusTiers::NotIncreasing {
                previous: pair[0],
                next: pair[1],
            });
        }
        Ok(Self(tiers))
    }

    /// User-selectable directory radii: 10, 25, 50, 100 km.
    pub fn directory() -> Self {
        Self(vec![10, 25, 50, 100])
    }

    /// Wide fallback used when a page wants "somewhere nearby": 75 then 150 km.
    pub fn fallback() -> Self {
        Self(vec![75, 150])
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn largest(&self) -> u32 {
        // non-empty by construction
        self.0[self.0.len() - 1]
    }
}

impl Default for RadiusTiers {
    fn default() -> Self {
        Self::directory()
    }
}

impl FromStr for RadiusTiers {
    type Err = InvalidRadiusTiers;

    /// Parse a comma-separated list such as `"10,25,50"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tiers = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| InvalidRadiusTiers::Parse(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(tiers)
    }
}

/// How location text is turned into a geocode cache key.
///
/// `Verbatim` keeps the text exactly as typed, so "Boston" and "boston "
/// are separate entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyNormalization {
    #[default]
    Verbatim,
    Trim,
    TrimLowercase,
}

impl KeyNormalization {
    /// Parse a mode name, falling back to `Verbatim`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trim" => Self::Trim,
            "trim_lowercase" | "lowercase" => Self::TrimLowercase,
            _ => Self::Verbatim,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verbatim => "verbatim",
            Self::Trim => "trim",
            Self::TrimLowercase => "trim_lowercase",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Verbatim => text.to_string(),
            Self::Trim => text.trim().to_string(),
            Self::TrimLowercase => text.trim().to_lowercase(),
        }
    }
}

impl std::fmt::Display for KeyNormalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
