//! Property tests for slug resolution.

use std::sync::Arc;

use cardlink_storage::{resolve_identifier, CardResolver, InMemoryCacheStore, MatchMethod};
use cardlink_test_utils::fixtures::{seed_cache, seed_remote};
use cardlink_test_utils::generators::*;
use cardlink_test_utils::{
    CacheSnapshot, CardRecord, CountingRemote, InMemoryDocumentStore, PublishState,
    ResolveError, ResolverConfig, Tier,
};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn published_with_id() -> impl Strategy<Value = (cardlink_test_utils::CardId, CardRecord)> {
    arb_card_id()
        .prop_flat_map(|id| (Just(id.clone()), arb_slug_for(id)))
        .prop_flat_map(|(id, slug)| {
            (Just(id), arb_card_record_with(slug, PublishState::Published))
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A published card in the remote store resolves by its slug, and the
    /// second resolution is served from the cache.
    #[test]
    fn prop_published_card_resolves_then_caches((id, record) in published_with_id()) {
        let rt = runtime();
        let cache = Arc::new(InMemoryCacheStore::new());
        let remote = Arc::new(CountingRemote::new(InMemoryDocumentStore::new()));
        seed_remote(remote.inner(), &id, &record);
        let resolver = CardResolver::new(cache.clone(), remote.clone(), ResolverConfig::default()).unwrap();

        let first = rt.block_on(resolver.resolve(&record.card_slug));
        prop_assert_eq!(first, Ok(record.clone()));
        let calls = remote.total_calls();

        let second = rt.block_on(resolver.resolve_detailed(&record.card_slug));
        prop_assert_eq!(second.source(), Some(Tier::Cache));
        prop_assert_eq!(remote.total_calls(), calls);
    }

    /// Draft cards are never returned, whichever tiers hold them.
    #[test]
    fn prop_draft_never_returned(
        (id, slug) in arb_card_id().prop_flat_map(|id| (Just(id.clone()), arb_slug_for(id))),
        cached in any::<bool>(),
    ) {
        let rt = runtime();
        let draft = CardRecord::new(slug.clone(), PublishState::Draft);
        let cache = Arc::new(InMemoryCacheStore::new());
        let remote = Arc::new(InMemoryDocumentStore::new());
        seed_remote(&remote, &id, &draft);
        if cached {
            rt.block_on(seed_cache(cache.as_ref(), &id, &draft)).unwrap();
        }
        let resolver = CardResolver::new(cache, remote, ResolverConfig::default()).unwrap();

        let result = rt.block_on(resolver.resolve(&slug));
        prop_assert_eq!(result, Err(ResolveError::not_found(slug)));
    }

    /// A projection carrying the exact slug always wins over the suffix
    /// heuristic, regardless of enumeration order.
    #[test]
    fn prop_projection_match_wins(
        (id, record) in published_with_id(),
        decoy in arb_card_id(),
        decoy_first in any::<bool>(),
    ) {
        prop_assume!(decoy != id);
        let rt = runtime();
        let store = InMemoryCacheStore::new();
        let decoy_record = CardRecord::new("someone-else", PublishState::Published);
        rt.block_on(async {
            if decoy_first {
                seed_cache(&store, &decoy, &decoy_record).await?;
                seed_cache(&store, &id, &record).await
            } else {
                seed_cache(&store, &id, &record).await?;
                seed_cache(&store, &decoy, &decoy_record).await
            }
        }).unwrap();

        let snapshot = rt.block_on(CacheSnapshot::load(&store)).unwrap();
        let matched = resolve_identifier(&record.card_slug, &snapshot, &ResolverConfig::default());

        prop_assert_eq!(matched.as_ref().map(|m| &m.id), Some(&id));
        prop_assert_eq!(matched.map(|m| m.method), Some(MatchMethod::SlugProjection));
    }

    /// Identifier derivation is a pure function of its inputs.
    #[test]
    fn prop_resolve_identifier_deterministic(
        ids in proptest::collection::vec(arb_card_id(), 0..8),
        slug in arb_slug(),
    ) {
        let snapshot = CacheSnapshot::from_entries(ids.into_iter().map(|id| {
            cardlink_storage::SnapshotEntry { id, has_profile: true, projection: None }
        }));
        let config = ResolverConfig::default();

        prop_assert_eq!(
            resolve_identifier(&slug, &snapshot, &config),
            resolve_identifier(&slug, &snapshot, &config)
        );
    }
}
