mod proximity_filter;

pub use proximity_filter::{ProximityFilter, EARTH_RADIUS_KM};
