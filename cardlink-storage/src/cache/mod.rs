//! Local cache layer.
//!
//! The cache holds a possibly-stale copy of cards this device has resolved
//! before. Each card occupies two independent keys:
//!
//! - `profile_<id>`: the full [`cardlink_core::CardRecord`]
//! - `card_data_<id>`: the `{cardStatus, cardSlug}` projection
//!
//! Either, both, or neither may exist, and they may disagree. Nothing in this
//! crate deletes or expires entries; they live until overwritten by a
//! write-through after a remote hit.
//!
//! # Example
//!
//! ```ignore
//! let store = InMemoryCacheStore::new();
//! CacheUpdate::new(CardId::new("abc123"), record).apply(&store).await?;
//!
//! let snapshot = CacheSnapshot::load(&store).await?;
//! assert_eq!(snapshot.len(), 1);
//! ```

pub mod entry;
pub mod key;
pub mod lmdb_backend;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use entry::CacheUpdate;
pub use key::{CacheKey, CacheKind, CARD_DATA_PREFIX, PROFILE_PREFIX};
pub use lmdb_backend::{LmdbCacheError, LmdbCacheStore};
pub use memory::InMemoryCacheStore;
pub use snapshot::{CacheSnapshot, SnapshotEntry};
pub use traits::{CacheStats, LocalCacheStore};
