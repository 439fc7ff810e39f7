//! In-memory peak cache
//!
//! Entries never expire unless a TTL is configured. Capacity is bounded;
//! once full, expired entries are dropped first and then the oldest insert.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::PeakCacheEntry;
use crate::ports::{CacheError, PeakCachePort};

#[derive(Debug, Clone)]
struct CachedPeak {
    entry: PeakCacheEntry,
    inserted_at: Instant,
}

impl CachedPeak {
    fn is_valid(&self, ttl: Option<Duration>) -> bool {
        ttl.map_or(true, |ttl| self.inserted_at.elapsed() < ttl)
    }
}

/// Process-local peak cache
#[derive(Debug)]
pub struct InMemoryPeakCache {
    entries: RwLock<HashMap<String, CachedPeak>>,
    /// `None` keeps entries forever
    ttl: Option<Duration>,
    max_entries: usize,
}

impl InMemoryPeakCache {
    /// Default max cache entries
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

    /// Permanent cache with default capacity
    pub fn new() -> Self {
        Self::with_config(None, Self::DEFAULT_MAX_ENTRIES)
    }

    pub fn with_config(ttl: Option<Duration>, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries (including expired)
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn make_room(&self, entries: &mut HashMap<String, CachedPeak>) {
        let ttl = self.ttl;
        entries.retain(|_, cached| cached.is_valid(ttl));

        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, cached)| cached.inserted_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl Default for InMemoryPeakCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeakCachePort for InMemoryPeakCache {
    async fn get(&self, contract: &str) -> Result<Option<PeakCacheEntry>, CacheError> {
        Ok(self
            .entries
            .read()
            .await
            .get(contract)
            .filter(|cached| cached.is_valid(self.ttl))
            .map(|cached| cached.entry.clone()))
    }

    async fn upsert(&self, entry: &PeakCacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(&entry.contract) && entries.len() >= self.max_entries {
            self.make_room(&mut entries);
        }
        entries.insert(
            entry.contract.clone(),
            CachedPeak {
                entry: entry.clone(),
                inserted_at: Instant::now(),
            },
        );
        Ok(())
    }
}
