use thiserror::Error;

/// All the ways the infrastructure around a refresh pass can go wrong
///
/// Per-package registry failures never show up here. Those are absorbed by
/// the resolver and simply mean "not closed".
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cache operation failed: {0}")]
    CacheError(#[from] closewatch_cache::CacheError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Inventory error: {0}")]
    InventoryError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
