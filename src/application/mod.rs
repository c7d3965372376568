//! Application Layer
//!
//! Use cases that orchestrate domain services and ports.

mod location_resolver;
mod vendor_search;

pub use location_resolver::{LocationResolver, DEFAULT_LOOKUP_DEADLINE};
pub use vendor_search::{VendorSearchOutcome, VendorSearchQuery, VendorSearchService};
