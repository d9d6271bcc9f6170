// SQLite-backed key-value store with optional expiry
// Survives restarts, which is the whole point

pub mod cache;

pub use cache::{CacheError, CacheManager};
