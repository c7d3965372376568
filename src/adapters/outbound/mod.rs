mod dashmap_geocode_cache;
mod nominatim_geocoder;
mod sqlite_geocode_cache;
mod sqlite_vendor_repo;

pub use dashmap_geocode_cache::DashMapGeocodeCache;
pub use nominatim_geocoder::{NominatimConfig, NominatimGeocoder, DEFAULT_NOMINATIM_URL};
pub use sqlite_geocode_cache::SqliteGeocodeCache;
pub use sqlite_vendor_repo::SqliteVendorRepository;
