//! Cache port (driven port).
//!
//! Key/value contract required from the external cache. No transactional
//! or durability guarantee; the cache is never authoritative.

use std::time::Duration;

use async_trait::async_trait;

/// Failure of a cache call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The cache could not be reached or the operation failed.
    #[error("Cache unavailable: {message}")]
    Unavailable {
        /// Transport-level detail.
        message: String,
    },
}

/// Port for the external key/value cache.
#[async_trait]
pub trait CachePort: Send + Sync {
    /// Read a value; `Ok(None)` is a miss.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` when the cache cannot be reached.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value with a time-to-live.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` when the cache cannot be reached.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}
