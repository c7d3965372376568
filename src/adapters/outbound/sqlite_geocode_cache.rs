//! SQLite Geocode Cache
//!
//! Implements GeocodeCache on a SQLite file so resolved locations survive
//! restarts. All rows are loaded into memory when the cache is opened;
//! writes go through to the file from a background writer.

use crate::adapters::outbound::DashMapGeocodeCache;
use crate::domain::ports::GeocodeCache;
use crate::domain::value_objects::Coordinate;
use anyhow::Result;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;

enum WriteOp {
    Put { key: String, value: Coordinate },
    Flush(oneshot::Sender<()>),
}

/// Persistent geocode cache.
///
/// Reads are served from memory. Inside a tokio runtime, writes are queued
/// to a writer task that runs the SQLite statements on the blocking pool,
/// in the order they were made. Outside a runtime they run inline. A failed
/// write is logged and the value stays cached in memory for the rest of the
/// process.
pub struct SqliteGeocodeCache {
    conn: Arc<Mutex<Connection>>,
    memory: DashMapGeocodeCache,
    writer: Option<mpsc::UnboundedSender<WriteOp>>,
}

impl SqliteGeocodeCache {
    /// Open (or create) the cache file and load every stored entry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS geocode_cache (
                location TEXT PRIMARY KEY NOT NULL,
                lat      REAL NOT NULL,
                lng      REAL NOT NULL
             )",
        )?;

        let entries = Self::load_entries(&conn)?;
        tracing::debug!("geocode cache loaded {} entries", entries.len());

        let conn = Arc::new(Mutex::new(conn));
        let writer = tokio::runtime::Handle::try_current().ok().map(|handle| {
            let (tx, rx) = mpsc::unbounded_channel();
            handle.spawn(Self::run_writer(conn.clone(), rx).in_current_span());
            tx
        });

        Ok(Self {
            conn,
            memory: DashMapGeocodeCache::with_entries(entries),
            writer,
        })
    }

    /// Wait until every write queued so far has reached the file.
    pub async fn flush(&self) {
        let Some(writer) = &self.writer else {
            return;
        };

        let (done_tx, done_rx) = oneshot::channel();
        if writer.send(WriteOp::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    async fn run_writer(conn: Arc<Mutex<Connection>>, mut rx: mpsc::UnboundedReceiver<WriteOp>) {
        while let Some(op) = rx.recv().await {
            match op {
                WriteOp::Put { key, value } => {
                    let conn = conn.clone();
                    let row_key = key.clone();
                    match tokio::task::spawn_blocking(move || {
                        Self::persist(&conn, &row_key, value)
                    })
                    .await
                    {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => Self::log_write_failure(&key, &e),
                        Err(e) => {
                            tracing::error!("geocode cache write task failed: {:?}", e);
                        }
                    }
                }
                WriteOp::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
    }

    fn log_write_failure(key: &str, e: &rusqlite::Error) {
        tracing::error!("failed to persist geocode cache entry {:?}: {:?}", key, e);
    }

    /// Read all rows, skipping any whose coordinates are no longer valid.
    fn load_entries(conn: &Connection) -> Result<Vec<(String, Coordinate)>> {
        let mut stmt = conn.prepare("SELECT location, lat, lng FROM geocode_cache")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (location, lat, lng) = row?;
            match Coordinate::new(lat, lng) {
                Ok(c) => entries.push((location, c)),
                Err(e) => tracing::warn!("skipping cached location {:?}: {}", location, e),
            }
        }

        Ok(entries)
    }

    fn persist(conn: &Mutex<Connection>, key: &str, value: Coordinate) -> rusqlite::Result<()> {
        conn.lock().execute(
            "INSERT OR REPLACE INTO geocode_cache (location, lat, lng) VALUES (?1, ?2, ?3)",
            params![key, value.latitude(), value.longitude()],
        )?;
        Ok(())
    }
}

impl GeocodeCache for SqliteGeocodeCache {
    fn get(&self, key: &str) -> Option<Coordinate> {
        self.memory.get(key)
    }

    fn set(&self, key: &str, value: Coordinate) {
        self.memory.set(key, value);

        let op = WriteOp::Put {
            key: key.to_string(),
            value,
        };
        let op = match &self.writer {
            Some(writer) => match writer.send(op) {
                Ok(()) => return,
                Err(mpsc::error::SendError(op)) => op,
            },
            None => op,
        };

        // No writer running: write inline.
        if let WriteOp::Put { key, value } = op {
            if let Err(e) = Self::persist(&self.conn, &key, value) {
                Self::log_write_failure(&key, &e);
            }
        }
    }

    fn len(&self) -> usize {
        self.memory.len()
    }
}
