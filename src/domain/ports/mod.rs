mod geocode_cache;
mod geocoder;
mod vendor_repository;

pub use geocode_cache::GeocodeCache;
pub use geocoder::Geocoder;
pub use vendor_repository::VendorRepository;
