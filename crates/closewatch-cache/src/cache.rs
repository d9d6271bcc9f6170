use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache connection lock was poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Persistent key-value cache using SQLite
///
/// Values are stored as JSON under a string key, optionally with an expiry.
/// SQLite was chosen because:
/// - Zero-config embedded database
/// - Writes are atomic, so readers see either the old value or the new one
/// - Doesn't require a separate process
pub struct CacheManager {
    conn: Mutex<Connection>,
}

impl CacheManager {
    /// Open (or create) the cache database at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Throwaway cache, handy for tests and dry runs
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // Initialize schema on first run
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS transients (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Read a value. Missing and expired keys both come back as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.conn()?;

        let row: Option<(String, Option<i64>)> = conn
            .query_row(
                "SELECT value, expires_at FROM transients WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((_, Some(expires_at))) if expires_at <= now => {
                debug!("Cache entry {} expired", key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Replace the value stored under `key`
    ///
    /// One upsert statement, so the swap is atomic. `ttl: None` means the
    /// entry never expires on its own.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let now = chrono::Utc::now().timestamp();
        let expires_at = ttl.map(|ttl| now.saturating_add(ttl.as_secs() as i64));

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO transients (key, value, expires_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at",
            params![key, json, expires_at, now],
        )?;

        Ok(())
    }

    /// Remove a key. Returns true if something was actually deleted.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM transients WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    /// Drop every expired entry, returns how many went away
    pub fn purge_expired(&self) -> Result<usize> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM transients WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            params![now],
        )?;
        Ok(removed)
    }
}
