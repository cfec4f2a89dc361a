//! In-memory cache store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use cardlink_core::{CacheError, CardlinkResult};

use super::traits::{CacheStats, LocalCacheStore};

/// Process-local cache store backed by an ordered map.
///
/// Keys enumerate in lexicographic order.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    stats: RwLock<CacheStats>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.read().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LocalCacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> CardlinkResult<Option<Vec<u8>>> {
        let value = self
            .entries
            .read()
            .map_err(|_| CacheError::LockPoisoned)?
            .get(key)
            .cloned();

        if let Ok(mut stats) = self.stats.write() {
            if value.is_some() {
                stats.hits += 1;
            } else {
                stats.misses += 1;
            }
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> CardlinkResult<()> {
        let entry_count = {
            let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
            entries.insert(key.to_string(), value);
            entries.len() as u64
        };

        if let Ok(mut stats) = self.stats.write() {
            stats.writes += 1;
            stats.entry_count = entry_count;
        }

        Ok(())
    }

    async fn list_keys(&self) -> CardlinkResult<Vec<String>> {
        Ok(self
            .entries
            .read()
            .map_err(|_| CacheError::LockPoisoned)?
            .keys()
            .cloned()
            .collect())
    }
}
