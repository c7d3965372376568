//! SQLite Vendor Repository
//!
//! Implements VendorRepository on top of a SQLite snapshot of the vendor
//! directory. Supports periodic reloading so moderation changes show up
//! without a restart.

use crate::domain::entities::Vendor;
use crate::domain::ports::VendorRepository;
use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags, Row};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};

/// SQLite-backed vendor repository.
///
/// Holds the last successfully loaded snapshot in memory. A failed reload
/// keeps the previous snapshot.
pub struct SqliteVendorRepository {
    vendors: Arc<RwLock<Vec<Vendor>>>,
    version: Arc<AtomicU64>,
}

impl SqliteVendorRepository {
    /// Create a new repository (empty until the first load).
    pub fn new() -> Self {
        Self {
            vendors: Arc::new(RwLock::new(Vec::new())),
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Load the directory once. Returns the number of vendors loaded.
    pub async fn reload(&self, db_path: &str) -> Result<usize> {
        Self::reload_into(&self.vendors, &self.version, db_path.to_string()).await
    }

    /// Start the background sync task.
    ///
    /// This spawns a Tokio task that periodically reloads vendors
    /// from the SQLite database file.
    pub fn start_sync(&self, db_path: String, interval_secs: u64) {
        let vendors = self.vendors.clone();
        let version = self.version.clone();

        tokio::spawn(async move {
            loop {
                if let Err(e) = Self::reload_into(&vendors, &version, db_path.clone()).await {
                    tracing::error!("error reading vendors: {:?}", e);
                }

                sleep(Duration::from_secs(interval_secs)).await;
            }
        });
    }

    async fn reload_into(
        vendors: &RwLock<Vec<Vendor>>,
        version: &AtomicU64,
        db_path: String,
    ) -> Result<usize> {
        let new_vendors =
            tokio::task::spawn_blocking(move || Self::load_from_sqlite(&db_path)).await??;

        let count = new_vendors.len();
        {
            let mut guard = vendors.write().await;
            *guard = new_vendors;
        }
        let new_version = version.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("vendor reload ok, version={} vendors={}", new_version, count);

        Ok(count)
    }

    /// Load vendors from SQLite database file.
    fn load_from_sqlite(db_path: &str) -> Result<Vec<Vendor>> {
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, name, category, city, lat, lng, approved
             FROM vendors
             WHERE deleted IS NULL OR deleted = 0",
        )?;

        let vendors = stmt
            .query_map([], |row| Self::row_to_vendor(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(vendors)
    }

    /// Convert a SQLite row to a Vendor entity.
    fn row_to_vendor(row: &Row) -> rusqlite::Result<Vendor> {
        Ok(Vendor {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            city: row.get(3)?,
            lat: row.get(4)?,
            lng: row.get(5)?,
            approved: row.get::<_, i64>(6)? != 0,
        })
    }
}

impl Default for SqliteVendorRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VendorRepository for SqliteVendorRepository {
    async fn get_listed(&self) -> Vec<Vendor> {
        self.vendors
            .read()
            .await
            .iter()
            .filter(|v| v.approved)
            .cloned()
            .collect()
    }

    async fn get_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}
