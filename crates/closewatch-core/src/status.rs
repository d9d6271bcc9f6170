// The persisted closed-status record
use std::sync::Arc;

use closewatch_cache::{CacheError, CacheManager};
use tracing::warn;

use crate::models::StatusRecord;
use crate::Result;

/// Process-wide handle on the single `<app>_closed` record
///
/// Readers always get a complete record: the refresh pass builds a new one
/// and swaps it in with a single write.
#[derive(Clone)]
pub struct StatusCache {
    cache: Arc<CacheManager>,
    key: String,
}

impl StatusCache {
    pub fn new(cache: Arc<CacheManager>, app_prefix: &str) -> Self {
        Self {
            cache,
            key: format!("{}_closed", app_prefix),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last stored record, or an empty one if there is none
    ///
    /// A record we can't decode (older format, hand-edited db) is treated as
    /// missing so the next throttle check recomputes it.
    pub fn read(&self) -> Result<StatusRecord> {
        match self.cache.get::<StatusRecord>(&self.key) {
            Ok(record) => Ok(record.unwrap_or_default()),
            Err(CacheError::Serialization(e)) => {
                warn!("Discarding unreadable {} record: {}", self.key, e);
                Ok(StatusRecord::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the whole record. No expiry, the throttle decides staleness.
    pub fn write(&self, record: &StatusRecord) -> Result<()> {
        self.cache.set(&self.key, record, None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClosedSet, PackageId};
    use chrono::Utc;

    fn status_cache() -> StatusCache {
        StatusCache::new(Arc::new(CacheManager::in_memory().unwrap()), "closewatch")
    }

    #[test]
    fn test_key_uses_prefix() {
        assert_eq!(status_cache().key(), "closewatch_closed");
    }

    #[test]
    fn test_read_defaults_on_miss() {
        let record = status_cache().read().unwrap();
        assert!(record.closed.is_empty());
        assert!(record.last_checked.is_none());
    }

    #[test]
    fn test_write_replaces_record() {
        let status = status_cache();

        let mut closed = ClosedSet::new();
        closed.insert(PackageId::new("a/a.php"), "gone".to_string());
        closed.insert(PackageId::new("b/b.php"), "also gone".to_string());
        status.write(&StatusRecord::new(closed, Utc::now())).unwrap();

        let mut closed = ClosedSet::new();
        closed.insert(PackageId::new("c/c.php"), "closed".to_string());
        let newer = StatusRecord::new(closed, Utc::now());
        status.write(&newer).unwrap();

        let stored = status.read().unwrap();
        assert_eq!(stored, newer);
        assert_eq!(stored.closed_count(), 1);
    }

    #[test]
    fn test_garbage_record_reads_as_default() {
        let cache = Arc::new(CacheManager::in_memory().unwrap());
        cache.set("closewatch_closed", &"not a record", None).unwrap();

        let record = StatusCache::new(cache, "closewatch").read().unwrap();
        assert_eq!(record, StatusRecord::default());
    }
}
