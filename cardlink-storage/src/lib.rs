//! Cardlink Storage - Tiered Card Resolution
//!
//! Resolves a public card slug to a published [`cardlink_core::CardRecord`]
//! by consulting, in order, a local cache, a direct remote fetch and a remote
//! query. The local cache is a possibly-stale copy; the remote document store
//! is the source of truth.
//!
//! ```ignore
//! let resolver = CardResolver::new(cache, remote, ResolverConfig::from_env())?;
//! let card = resolver.resolve("john-doe-abc123").await?;
//! ```

pub mod cache;
pub mod engine;
pub mod remote;
pub mod resolver;
pub mod service;
pub mod tier;

pub use cache::{
    CacheKey, CacheKind, CacheSnapshot, CacheStats, CacheUpdate, InMemoryCacheStore,
    LmdbCacheError, LmdbCacheStore, LocalCacheStore, SnapshotEntry,
};
pub use engine::{LookupOutcome, Resolution, TieredLookup};
pub use remote::{
    published_slug_query, FieldPredicate, InMemoryDocumentStore, RemoteDocument,
    RemoteDocumentStore,
};
pub use resolver::{resolve_identifier, IdentifierMatch, MatchMethod};
pub use service::CardResolver;
pub use tier::{AttemptStatus, MissReason, Tier, TierAttempt, TierOutcome};
