//! Vendor Repository Port
//!
//! Defines the interface for reading the vendor directory.

use crate::domain::entities::Vendor;
use async_trait::async_trait;

/// Read access to the vendor directory.
///
/// The directory itself is owned elsewhere; search only reads it.
#[async_trait]
pub trait VendorRepository: Send + Sync {
    /// Get vendors approved for public listing.
    async fn get_listed(&self) -> Vec<Vendor>;

    /// Version of the directory snapshot, bumped on every successful reload.
    async fn get_version(&self) -> u64;
}
