//! Local cache store trait.
//!
//! The local cache is a plain byte-oriented key/value store: process- or
//! device-local, last-writer-wins, no expiry. Card-shaped access lives in
//! [`super::entry`] on top of these three operations.

use async_trait::async_trait;
use cardlink_core::CardlinkResult;

/// Key/value store holding cached card records.
///
/// Implementations must be safe for concurrent use. Resolutions of different
/// slugs run unsynchronized against the same store.
#[async_trait]
pub trait LocalCacheStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> CardlinkResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: Vec<u8>) -> CardlinkResult<()>;

    /// Every key currently in the store, in the store's enumeration order.
    async fn list_keys(&self) -> CardlinkResult<Vec<String>>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of `get` calls that found a value.
    pub hits: u64,
    /// Number of `get` calls that found nothing.
    pub misses: u64,
    /// Number of `set` calls.
    pub writes: u64,
    /// Number of entries currently in the cache.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
