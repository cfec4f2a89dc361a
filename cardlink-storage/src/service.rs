//! Resolution entry point.

use std::sync::Arc;

use cardlink_core::{CardRecord, ConfigError, ResolveError, ResolverConfig};
use tracing::{debug, warn};

use crate::cache::{CacheSnapshot, LocalCacheStore};
use crate::engine::{LookupOutcome, TieredLookup};
use crate::remote::RemoteDocumentStore;

/// Resolves public card slugs, populating the local cache as it goes.
///
/// Each call loads a fresh [`CacheSnapshot`], runs the [`TieredLookup`] and,
/// when write-through is enabled, applies the returned cache update. Cache
/// write failures are logged and never change the result.
pub struct CardResolver<C, R> {
    cache: Arc<C>,
    lookup: TieredLookup<C, R>,
}

impl<C, R> CardResolver<C, R>
where
    C: LocalCacheStore,
    R: RemoteDocumentStore,
{
    /// Build a resolver, rejecting a configuration that fails
    /// [`ResolverConfig::validate`].
    pub fn new(cache: Arc<C>, remote: Arc<R>, config: ResolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            lookup: TieredLookup::new(cache.clone(), remote, config),
            cache,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        self.lookup.config()
    }

    /// Resolve `slug` to its published card.
    pub async fn resolve(&self, slug: &str) -> Result<CardRecord, ResolveError> {
        self.resolve_detailed(slug)
            .await
            .result
            .map(|resolution| resolution.record)
    }

    /// Like [`resolve`](Self::resolve), returning the full lookup trace.
    pub async fn resolve_detailed(&self, slug: &str) -> LookupOutcome {
        let snapshot = match CacheSnapshot::load(self.cache.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(slug = %slug, error = %e, "Failed to enumerate local cache");
                return LookupOutcome {
                    identifier: None,
                    attempts: Vec::new(),
                    result: Err(ResolveError::load_failed(e)),
                };
            }
        };
        debug!(slug = %slug, cached_cards = snapshot.len(), "Loaded cache snapshot");

        let outcome = self.lookup.lookup(slug, &snapshot).await;

        if self.config().write_through {
            if let Some(update) = outcome
                .result
                .as_ref()
                .ok()
                .and_then(|r| r.cache_update.as_ref())
            {
                match update.apply(self.cache.as_ref()).await {
                    Ok(()) => debug!(id = %update.id, "Cached resolved card"),
                    Err(e) => warn!(id = %update.id, error = %e, "Failed to cache resolved card"),
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, InMemoryCacheStore};
    use crate::remote::InMemoryDocumentStore;
    use crate::tier::Tier;
    use cardlink_core::{CardId, PublishState};

    fn resolver(
        config: ResolverConfig,
    ) -> (
        Arc<InMemoryCacheStore>,
        Arc<InMemoryDocumentStore>,
        CardResolver<InMemoryCacheStore, InMemoryDocumentStore>,
    ) {
        let cache = Arc::new(InMemoryCacheStore::new());
        let remote = Arc::new(InMemoryDocumentStore::new());
        let resolver = CardResolver::new(cache.clone(), remote.clone(), config).unwrap();
        (cache, remote, resolver)
    }

    fn jane() -> CardRecord {
        CardRecord::new("jane-smith-xyz999", PublishState::Published).with_full_name("Jane Smith")
    }

    #[tokio::test]
    async fn test_remote_hit_is_written_through() {
        let (cache, remote, resolver) = resolver(ResolverConfig::default());
        remote.insert_card("users", CardId::new("xyz999"), &jane());

        let record = resolver.resolve("jane-smith-xyz999").await.unwrap();
        assert_eq!(record, jane());

        let id = CardId::new("xyz999");
        assert!(cache.contains_key(&CacheKey::profile(&id).encode()));
        assert!(cache.contains_key(&CacheKey::card_data(&id).encode()));

        // The second navigation is served from the cache via the projection.
        let outcome = resolver.resolve_detailed("jane-smith-xyz999").await;
        assert_eq!(outcome.source(), Some(Tier::Cache));
    }

    #[tokio::test]
    async fn test_write_through_disabled() {
        let (cache, remote, resolver) =
            resolver(ResolverConfig::default().with_write_through(false));
        remote.insert_card("users", CardId::new("xyz999"), &jane());

        assert!(resolver.resolve("jane-smith-xyz999").await.is_ok());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let cache = Arc::new(InMemoryCacheStore::new());
        let remote = Arc::new(InMemoryDocumentStore::new());

        let result = CardResolver::new(
            cache,
            remote,
            ResolverConfig::default().with_min_suffix_len(0),
        );

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "min_suffix_len"
        ));
    }

    #[tokio::test]
    async fn test_resolve_surfaces_lookup_error() {
        let (_cache, _remote, resolver) = resolver(ResolverConfig::default());
        assert_eq!(
            resolver.resolve("ghost-card-000000").await,
            Err(ResolveError::not_found("ghost-card-000000"))
        );
        assert_eq!(
            resolver.resolve("").await,
            Err(ResolveError::invalid_slug(""))
        );
    }
}
