//! LMDB-backed cache store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a persistent,
//! memory-mapped, device-local key/value store for cached cards.
//!
//! Reads (`get`, `list_keys`) run in LMDB read transactions and each `set`
//! commits its own write transaction, so concurrent resolutions see
//! last-writer-wins semantics per key.

use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use cardlink_core::{CacheError, CardlinkError, CardlinkResult};
use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use super::traits::{CacheStats, LocalCacheStore};

/// Failures opening or using the on-disk card cache.
#[derive(Debug, thiserror::Error)]
pub enum LmdbCacheError {
    #[error("Cannot open card cache environment: {0}")]
    EnvOpen(String),

    #[error("Cannot open card cache database: {0}")]
    DbOpen(String),

    #[error("Card cache transaction failed: {0}")]
    Transaction(String),

    #[error("Card cache directory: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbCacheError> for CardlinkError {
    fn from(e: LmdbCacheError) -> Self {
        CardlinkError::Cache(CacheError::Backend {
            reason: e.to_string(),
        })
    }
}

/// Persistent cache store in a single unnamed LMDB database.
///
/// Keys enumerate in LMDB's byte order.
///
/// # Example
///
/// ```ignore
/// let store = LmdbCacheStore::new("/var/lib/cardlink/cache", 64)?;
/// let resolver = CardResolver::new(Arc::new(store), remote, ResolverConfig::from_env())?;
/// ```
pub struct LmdbCacheStore {
    env: Env,
    db: Database<Str, Bytes>,
    stats: RwLock<CacheStats>,
}

impl LmdbCacheStore {
    /// Open the cache under `path`, creating the directory if needed.
    ///
    /// `max_size_mb` bounds the memory map. Existing entries are kept, so a
    /// reopened store serves cards cached by earlier runs.
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbCacheError> {
        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment is opened once per directory by this store
        // and never mapped twice within the process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbCacheError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let db: Database<Str, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbCacheError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let entry_count = {
            let rtxn = env
                .read_txn()
                .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
            db.len(&rtxn)
                .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?
        };

        Ok(Self {
            env,
            db,
            stats: RwLock::new(CacheStats {
                entry_count,
                ..Default::default()
            }),
        })
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.read().map(|s| s.clone()).unwrap_or_default()
    }

    fn record_read(&self, hit: bool) {
        if let Ok(mut stats) = self.stats.write() {
            if hit {
                stats.hits += 1;
            } else {
                stats.misses += 1;
            }
        }
    }
}

#[async_trait]
impl LocalCacheStore for LmdbCacheStore {
    async fn get(&self, key: &str) -> CardlinkResult<Option<Vec<u8>>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let value = self
            .db
            .get(&rtxn, key)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?
            .map(|bytes| bytes.to_vec());

        self.record_read(value.is_some());
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> CardlinkResult<()> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, key, &value)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let entry_count = self
            .db
            .len(&wtxn)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        if let Ok(mut stats) = self.stats.write() {
            stats.writes += 1;
            stats.entry_count = entry_count;
        }

        Ok(())
    }

    async fn list_keys(&self) -> CardlinkResult<Vec<String>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let iter = self
            .db
            .iter(&rtxn)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let mut keys = Vec::new();
        for result in iter {
            match result {
                Ok((key, _)) => keys.push(key.to_string()),
                // Non-UTF-8 keys were not written by us.
                Err(heed::Error::Decoding(_)) => continue,
                Err(e) => return Err(LmdbCacheError::Transaction(e.to_string()).into()),
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbCacheStore, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let store = LmdbCacheStore::new(temp_dir.path(), 10).expect("store creation should succeed");
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (store, _temp_dir) = create_test_store();

        store
            .set("profile_abc123", br#"{"cardSlug":"john-doe-abc123"}"#.to_vec())
            .await
            .expect("set should succeed");

        let value = store
            .get("profile_abc123")
            .await
            .expect("get should succeed");
        assert_eq!(value.as_deref(), Some(&br#"{"cardSlug":"john-doe-abc123"}"#[..]));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let (store, _temp_dir) = create_test_store();
        let value = store.get("profile_nobody").await.expect("get should succeed");
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let (store, _temp_dir) = create_test_store();

        store.set("card_data_abc123", b"old".to_vec()).await.expect("set should succeed");
        store.set("card_data_abc123", b"new".to_vec()).await.expect("set should succeed");

        let value = store.get("card_data_abc123").await.expect("get should succeed");
        assert_eq!(value, Some(b"new".to_vec()));
        assert_eq!(store.stats().entry_count, 1);
    }

    #[tokio::test]
    async fn test_list_keys() {
        let (store, _temp_dir) = create_test_store();

        for key in ["profile_b", "card_data_b", "profile_a"] {
            store.set(key, vec![]).await.expect("set should succeed");
        }

        let keys = store.list_keys().await.expect("list_keys should succeed");
        assert_eq!(keys, vec!["card_data_b", "profile_a", "profile_b"]);
    }

    #[tokio::test]
    async fn test_list_keys_skips_non_utf8_keys() {
        let (store, _temp_dir) = create_test_store();
        store.set("profile_abc123", b"{}".to_vec()).await.expect("set should succeed");

        let raw = store.db.remap_key_type::<Bytes>();
        let mut wtxn = store.env.write_txn().expect("write txn should open");
        raw.put(&mut wtxn, &[0xff, 0xfe, 0x00][..], b"{}")
            .expect("raw put should succeed");
        wtxn.commit().expect("commit should succeed");

        let keys = store.list_keys().await.expect("list_keys should succeed");
        assert_eq!(keys, vec!["profile_abc123"]);
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");

        {
            let store = LmdbCacheStore::new(temp_dir.path(), 10).expect("store creation should succeed");
            store.set("profile_abc123", b"{}".to_vec()).await.expect("set should succeed");
        }

        let store = LmdbCacheStore::new(temp_dir.path(), 10).expect("reopen should succeed");
        assert_eq!(store.stats().entry_count, 1);
        assert!(store
            .get("profile_abc123")
            .await
            .expect("get should succeed")
            .is_some());
    }

    #[tokio::test]
    async fn test_stats() {
        let (store, _temp_dir) = create_test_store();

        let _ = store.get("profile_abc123").await;
        store.set("profile_abc123", b"{}".to_vec()).await.expect("set should succeed");
        let _ = store.get("profile_abc123").await;
        let _ = store.get("profile_abc123").await;

        let stats = store.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.writes, 1);
    }
}
