//! Cardlink Test Utilities
//!
//! Shared test infrastructure for the cardlink workspace:
//! - Proptest generators for cards, identifiers and slugs
//! - Instrumented and failing store wrappers
//! - Fixtures for the common cache/remote scenarios
//! - Assertions on resolution results

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

// Re-export the types every test touches
pub use cardlink_core::{
    CacheError, CardId, CardProjection, CardRecord, CardlinkError, CardlinkResult, PublishState,
    RemoteError, ResolveError, ResolverConfig,
};
pub use cardlink_storage::{
    AttemptStatus, CacheKey, CacheSnapshot, CacheUpdate, CardResolver, FieldPredicate,
    InMemoryCacheStore, InMemoryDocumentStore, LocalCacheStore, LookupOutcome, MissReason,
    RemoteDocument, RemoteDocumentStore, Tier,
};

/// Install a test-friendly subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to debug output from the storage crate.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cardlink_storage=debug,warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// STORE WRAPPERS
// ============================================================================

/// Remote store wrapper that counts calls.
#[derive(Debug, Default)]
pub struct CountingRemote<R = InMemoryDocumentStore> {
    inner: R,
    fetches: AtomicUsize,
    queries: AtomicUsize,
}

impl<R> CountingRemote<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            fetches: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Fetches plus queries.
    pub fn total_calls(&self) -> usize {
        self.fetch_count() + self.query_count()
    }
}

#[async_trait]
impl<R: RemoteDocumentStore> RemoteDocumentStore for CountingRemote<R> {
    async fn fetch(&self, collection: &str, id: &CardId) -> CardlinkResult<Option<RemoteDocument>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(collection, id).await
    }

    async fn query(
        &self,
        collection: &str,
        predicates: &[FieldPredicate],
    ) -> CardlinkResult<Vec<RemoteDocument>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(collection, predicates).await
    }
}

/// Remote store wrapper that fails selected operations.
#[derive(Debug)]
pub struct FailingRemote<R = InMemoryDocumentStore> {
    inner: R,
    error: RemoteError,
    fail_fetch: bool,
    fail_query: bool,
}

impl<R> FailingRemote<R> {
    /// Fail every fetch and query.
    pub fn always(inner: R, error: RemoteError) -> Self {
        Self {
            inner,
            error,
            fail_fetch: true,
            fail_query: true,
        }
    }

    /// Fail fetches; queries reach `inner`.
    pub fn on_fetch(inner: R, error: RemoteError) -> Self {
        Self {
            fail_query: false,
            ..Self::always(inner, error)
        }
    }

    /// Fail queries; fetches reach `inner`.
    pub fn on_query(inner: R, error: RemoteError) -> Self {
        Self {
            fail_fetch: false,
            ..Self::always(inner, error)
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: RemoteDocumentStore> RemoteDocumentStore for FailingRemote<R> {
    async fn fetch(&self, collection: &str, id: &CardId) -> CardlinkResult<Option<RemoteDocument>> {
        if self.fail_fetch {
            return Err(self.error.clone().into());
        }
        self.inner.fetch(collection, id).await
    }

    async fn query(
        &self,
        collection: &str,
        predicates: &[FieldPredicate],
    ) -> CardlinkResult<Vec<RemoteDocument>> {
        if self.fail_query {
            return Err(self.error.clone().into());
        }
        self.inner.query(collection, predicates).await
    }
}

/// In-memory cache whose writes and/or key enumeration fail.
///
/// Reads always reach the wrapped store, so it can be seeded through
/// [`FailingCacheStore::inner`].
#[derive(Debug, Default)]
pub struct FailingCacheStore {
    inner: InMemoryCacheStore,
    fail_writes: bool,
    fail_list: bool,
}

impl FailingCacheStore {
    /// Every `set` fails.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// `list_keys` fails, so no snapshot can be loaded.
    pub fn failing_list() -> Self {
        Self {
            fail_list: true,
            ..Self::default()
        }
    }

    pub fn inner(&self) -> &InMemoryCacheStore {
        &self.inner
    }
}

#[async_trait]
impl LocalCacheStore for FailingCacheStore {
    async fn get(&self, key: &str) -> CardlinkResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> CardlinkResult<()> {
        if self.fail_writes {
            return Err(CacheError::Backend {
                reason: format!("write to {key} rejected"),
            }
            .into());
        }
        self.inner.set(key, value).await
    }

    async fn list_keys(&self) -> CardlinkResult<Vec<String>> {
        if self.fail_list {
            return Err(CacheError::Backend {
                reason: "key enumeration unavailable".to_string(),
            }
            .into());
        }
        self.inner.list_keys().await
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for cardlink types.

    use super::*;
    use proptest::prelude::*;

    /// Store-style identifier: 6 to 20 alphanumerics.
    pub fn arb_card_id() -> impl Strategy<Value = CardId> {
        "[A-Za-z0-9]{6,20}".prop_map(CardId::new)
    }

    /// Human part of a slug, e.g. `john-doe`.
    pub fn arb_slug_name() -> impl Strategy<Value = String> {
        "[a-z]{1,8}(-[a-z]{1,8}){0,2}"
    }

    /// Slug ending in the last six characters of `id`.
    pub fn arb_slug_for(id: CardId) -> impl Strategy<Value = String> {
        arb_slug_name().prop_map(move |name| {
            let chars: Vec<char> = id.as_str().chars().collect();
            let suffix: String = chars[chars.len().saturating_sub(6)..].iter().collect();
            format!("{name}-{suffix}")
        })
    }

    /// A slug whose last segment is an arbitrary 6-character token.
    pub fn arb_slug() -> impl Strategy<Value = String> {
        (arb_slug_name(), "[a-z0-9]{6}").prop_map(|(name, suffix)| format!("{name}-{suffix}"))
    }

    pub fn arb_publish_state() -> impl Strategy<Value = PublishState> {
        prop_oneof![Just(PublishState::Draft), Just(PublishState::Published)]
    }

    fn arb_text() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[A-Za-z ,;]{1,24}")
    }

    /// Card with the given slug and state and arbitrary profile fields.
    pub fn arb_card_record_with(
        slug: String,
        state: PublishState,
    ) -> impl Strategy<Value = CardRecord> {
        (arb_text(), arb_text(), arb_text(), arb_text()).prop_map(
            move |(full_name, job_title, company_name, city)| CardRecord {
                full_name,
                job_title,
                company_name,
                city,
                ..CardRecord::new(slug.clone(), state)
            },
        )
    }

    pub fn arb_card_record() -> impl Strategy<Value = CardRecord> {
        (arb_slug(), arb_publish_state())
            .prop_flat_map(|(slug, state)| arb_card_record_with(slug, state))
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built cards and store states.

    use super::*;

    pub fn published_card(slug: &str, full_name: &str) -> CardRecord {
        CardRecord::new(slug, PublishState::Published).with_full_name(full_name)
    }

    pub fn draft_card(slug: &str) -> CardRecord {
        CardRecord::new(slug, PublishState::Draft)
    }

    /// John Doe, published under `john-doe-abc123` with identifier `abc123`.
    pub fn john_doe() -> (CardId, CardRecord) {
        (
            CardId::new("abc123"),
            published_card("john-doe-abc123", "John Doe"),
        )
    }

    /// Jane Smith, published under `jane-smith-xyz999` with identifier `xyz999`.
    pub fn jane_smith() -> (CardId, CardRecord) {
        (
            CardId::new("xyz999"),
            published_card("jane-smith-xyz999", "Jane Smith"),
        )
    }

    /// Write both cache entries for `record` under `id`.
    pub async fn seed_cache<C: LocalCacheStore + ?Sized>(
        store: &C,
        id: &CardId,
        record: &CardRecord,
    ) -> CardlinkResult<()> {
        CacheUpdate::new(id.clone(), record.clone()).apply(store).await
    }

    /// Write raw bytes under `key`, bypassing encoding.
    pub async fn seed_raw<C: LocalCacheStore + ?Sized>(
        store: &C,
        key: &CacheKey,
        bytes: &[u8],
    ) -> CardlinkResult<()> {
        store.set(&key.encode(), bytes.to_vec()).await
    }

    /// Insert `record` into the default `users` collection.
    pub fn seed_remote(store: &InMemoryDocumentStore, id: &CardId, record: &CardRecord) {
        store.insert_card(cardlink_core::config::DEFAULT_COLLECTION, id.clone(), record);
    }

    /// Insert a raw JSON document into the default `users` collection.
    pub fn seed_remote_raw(store: &InMemoryDocumentStore, id: &CardId, data: serde_json::Value) {
        store.insert(cardlink_core::config::DEFAULT_COLLECTION, id.clone(), data);
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on resolution outcomes.

    use super::*;

    pub fn assert_not_found<T: std::fmt::Debug>(result: &Result<T, ResolveError>) {
        assert!(
            matches!(result, Err(ResolveError::NotFound { .. })),
            "Expected NotFound, got {:?}",
            result
        );
    }

    pub fn assert_invalid_slug<T: std::fmt::Debug>(result: &Result<T, ResolveError>) {
        assert!(
            matches!(result, Err(ResolveError::InvalidSlug { .. })),
            "Expected InvalidSlug, got {:?}",
            result
        );
    }

    /// The lookup succeeded from `tier`.
    pub fn assert_resolved_from(outcome: &LookupOutcome, tier: Tier) {
        assert_eq!(
            outcome.source(),
            Some(tier),
            "Expected resolution from {tier}, got {:?}",
            outcome.result
        );
    }

    /// `tier` ran and reported `status`.
    pub fn assert_attempt(outcome: &LookupOutcome, tier: Tier, status: AttemptStatus) {
        let attempt = outcome
            .attempt(tier)
            .unwrap_or_else(|| panic!("{tier} was not attempted: {:?}", outcome.attempts));
        assert_eq!(attempt.status, status, "Unexpected status for {tier}");
    }
}
