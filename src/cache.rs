use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::store::Row;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    rows: Vec<Row>,
    cached_at: DateTime<Local>,
}

/// TTL cache of whole-table reads, keyed by table name.
///
/// Entries expire after the configured time-to-live; every write path calls
/// [`ReadCache::invalidate_all`] so a read issued after a write always hits
/// the store. There is no cross-process coherency.
pub struct ReadCache {
    db: sled::Db,
    ttl: Duration,
}

impl ReadCache {
    /// Open the cache under `dir`, creating the directory if needed.
    pub fn open(dir: &Path, ttl: Duration) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let db = sled::open(dir)?;
        Ok(Self { db, ttl })
    }

    /// Cached rows for `table`, if present and still fresh.
    pub fn get(&self, table: &str) -> Result<Option<Vec<Row>>> {
        if let Some(data) = self.db.get(table.as_bytes())? {
            let entry: CacheEntry = bincode::deserialize(&data)?;
            let age = Local::now().signed_duration_since(entry.cached_at);
            if age.num_milliseconds() >= 0 && age.to_std().is_ok_and(|a| a <= self.ttl) {
                return Ok(Some(entry.rows));
            }
            // stale entry, drop it
            self.db.remove(table.as_bytes())?;
            debug!(table, "evicted stale cache entry");
        }
        Ok(None)
    }

    /// Store a fresh snapshot of `table`.
    pub fn put(&self, table: &str, rows: &[Row]) -> Result<()> {
        let entry = CacheEntry { rows: rows.to_vec(), cached_at: Local::now() };
        let data = bincode::serialize(&entry)?;
        self.db.insert(table.as_bytes(), data)?;
        self.db.flush()?;
        Ok(())
    }

    /// Drop every cached table. Called after each write so subsequent reads
    /// reflect it.
    pub fn invalidate_all(&self) -> Result<()> {
        self.db.clear()?;
        self.db.flush()?;
        Ok(())
    }
}
