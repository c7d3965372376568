//! vendor-locator Library
//!
//! Location-based vendor discovery: resolve free-text place names to
//! coordinates through a caching geocoder, then find directory vendors
//! near them with progressively wider search radii.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{LocationResolver, VendorSearchQuery, VendorSearchService};
pub use config::load_config;
pub use domain::entities::{Locatable, ProximityResult, Vendor};
pub use domain::errors::{GeocodeError, ResolveError};
pub use domain::ports::{GeocodeCache, Geocoder, VendorRepository};
pub use domain::services::ProximityFilter;
pub use domain::value_objects::{Coordinate, KeyNormalization, RadiusTiers};
pub use infrastructure::CancelHandle;
