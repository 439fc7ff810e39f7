use async_trait::async_trait;
use thiserror::Error;

use crate::domain::PeakCacheEntry;

/// Peak cache error type
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    #[error("Cache store returned status {status}: {message}")]
    StoreError { status: u16, message: String },

    #[error("Cache record malformed: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CacheError::Malformed(err.to_string())
        } else {
            CacheError::Unavailable(err.to_string())
        }
    }
}

/// Durable store of computed peak multiples, keyed by contract
#[async_trait]
pub trait PeakCachePort: Send + Sync {
    /// Fetch the entry for a contract, `Ok(None)` on miss
    async fn get(&self, contract: &str) -> Result<Option<PeakCacheEntry>, CacheError>;

    /// Insert or replace the entry for `entry.contract`
    async fn upsert(&self, entry: &PeakCacheEntry) -> Result<(), CacheError>;
}
