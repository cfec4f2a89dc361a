//! Tiered lookup engine.
//!
//! A lookup runs a fixed fallback chain against an already-loaded
//! [`CacheSnapshot`]:
//!
//! 1. derive an identifier from the slug ([`resolve_identifier`])
//! 2. [`Tier::Cache`]: the cached profile and projection for that identifier
//! 3. [`Tier::DirectFetch`]: the remote document for that identifier
//! 4. [`Tier::Query`]: a remote query on slug and publish state
//!
//! Tiers 1 and 2 need an identifier and are skipped without one. Tier 3
//! always runs if reached. Each tier reports a [`TierOutcome`]; misses and
//! errors both fall through, and every attempt is recorded in the
//! [`LookupOutcome`] trace.
//!
//! The engine only reads. A remote hit comes back with a [`CacheUpdate`] the
//! caller may apply.

use std::future::Future;
use std::sync::Arc;

use cardlink_core::{
    identifier_suffix, is_blank_slug, CacheError, CardId, CardProjection, CardRecord,
    CardlinkError, CardlinkResult, RemoteError, ResolveError, ResolverConfig,
};
use tracing::{debug, info, warn};

use crate::cache::{entry, CacheKey, CacheSnapshot, CacheUpdate, LocalCacheStore};
use crate::remote::{published_slug_query, RemoteDocumentStore};
use crate::resolver::{resolve_identifier, IdentifierMatch};
use crate::tier::{AttemptStatus, MissReason, Tier, TierAttempt, TierOutcome};

/// A card found by some tier.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Identifier the record lives under.
    pub id: CardId,
    pub record: CardRecord,
    /// Tier that produced the record.
    pub source: Tier,
    /// Write-through for remote hits; `None` for cache hits.
    pub cache_update: Option<CacheUpdate>,
}

/// Everything a lookup did, including how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    /// Identifier derived from the slug, if any.
    pub identifier: Option<IdentifierMatch>,
    /// Tiers attempted, in order.
    pub attempts: Vec<TierAttempt>,
    pub result: Result<Resolution, ResolveError>,
}

impl LookupOutcome {
    fn rejected(result: ResolveError) -> Self {
        Self {
            identifier: None,
            attempts: Vec::new(),
            result: Err(result),
        }
    }

    /// Tier that produced the record, if the lookup succeeded.
    pub fn source(&self) -> Option<Tier> {
        self.result.as_ref().ok().map(|r| r.source)
    }

    /// True if any remote tier ran.
    pub fn touched_remote(&self) -> bool {
        self.attempts.iter().any(|a| a.tier.is_remote())
    }

    /// The trace entry for `tier`, if it ran.
    pub fn attempt(&self, tier: Tier) -> Option<&TierAttempt> {
        self.attempts.iter().find(|a| a.tier == tier)
    }
}

/// Runs the cache, direct-fetch and query tiers in order.
pub struct TieredLookup<C, R> {
    cache: Arc<C>,
    remote: Arc<R>,
    config: ResolverConfig,
}

impl<C, R> TieredLookup<C, R>
where
    C: LocalCacheStore,
    R: RemoteDocumentStore,
{
    pub fn new(cache: Arc<C>, remote: Arc<R>, config: ResolverConfig) -> Self {
        Self {
            cache,
            remote,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `slug` to a published card.
    pub async fn lookup(&self, slug: &str, snapshot: &CacheSnapshot) -> LookupOutcome {
        if is_blank_slug(slug) {
            debug!(slug = %slug, "Rejecting blank slug");
            return LookupOutcome::rejected(ResolveError::invalid_slug(slug));
        }

        let identifier = resolve_identifier(slug, snapshot, &self.config);
        let mut attempts = Vec::with_capacity(3);

        match identifier.as_ref().map(|m| (m.id.clone(), m.method)) {
            Some((id, method)) => {
                debug!(slug = %slug, id = %id, method = ?method, "Resolved identifier");

                let outcome = self.tier_cache(&id, slug).await;
                if let Some(resolution) = record_attempt(&mut attempts, Tier::Cache, outcome) {
                    return self.finish(slug, identifier, attempts, resolution);
                }

                let outcome = self.tier_direct_fetch(&id, slug).await;
                if let Some(resolution) = record_attempt(&mut attempts, Tier::DirectFetch, outcome) {
                    return self.finish(slug, identifier, attempts, resolution);
                }
            }
            None => {
                debug!(slug = %slug, "No identifier derived, skipping identifier tiers");
                for tier in [Tier::Cache, Tier::DirectFetch] {
                    attempts.push(TierAttempt {
                        tier,
                        status: AttemptStatus::Miss(MissReason::NoIdentifier),
                    });
                }
            }
        }

        let outcome = self.tier_query(slug).await;
        if let Some(resolution) = record_attempt(&mut attempts, Tier::Query, outcome) {
            return self.finish(slug, identifier, attempts, resolution);
        }

        let has_suffix =
            identifier_suffix(slug, self.config.slug_separator, self.config.min_suffix_len)
                .is_some();
        let error = if identifier.is_some() || has_suffix {
            ResolveError::not_found(slug)
        } else {
            ResolveError::invalid_slug(slug)
        };
        debug!(slug = %slug, error = %error, "Lookup exhausted all tiers");

        LookupOutcome {
            identifier,
            attempts,
            result: Err(error),
        }
    }

    fn finish(
        &self,
        slug: &str,
        identifier: Option<IdentifierMatch>,
        attempts: Vec<TierAttempt>,
        resolution: Resolution,
    ) -> LookupOutcome {
        info!(
            slug = %slug,
            id = %resolution.id,
            tier = %resolution.source,
            "Resolved card"
        );
        LookupOutcome {
            identifier,
            attempts,
            result: Ok(resolution),
        }
    }

    /// Tier 1: serve from the cache when both halves of the entry are present
    /// and the projection is published under exactly `slug`.
    pub async fn tier_cache(&self, id: &CardId, slug: &str) -> TierOutcome<Resolution> {
        let projection = match self
            .read_cached::<CardProjection>(&CacheKey::card_data(id))
            .await
        {
            Ok(Some(projection)) => projection,
            Ok(None) => return TierOutcome::Miss(MissReason::Incomplete),
            Err(MissOrError::Miss(reason)) => return TierOutcome::Miss(reason),
            Err(MissOrError::Error(e)) => return TierOutcome::Error(e),
        };

        if !projection.card_status.is_published() {
            return TierOutcome::Miss(MissReason::Unpublished);
        }
        if projection.card_slug != slug {
            return TierOutcome::Miss(MissReason::SlugMismatch);
        }

        match self.read_cached::<CardRecord>(&CacheKey::profile(id)).await {
            Ok(Some(record)) => TierOutcome::Hit(Resolution {
                id: id.clone(),
                record,
                source: Tier::Cache,
                cache_update: None,
            }),
            Ok(None) => TierOutcome::Miss(MissReason::Incomplete),
            Err(MissOrError::Miss(reason)) => TierOutcome::Miss(reason),
            Err(MissOrError::Error(e)) => TierOutcome::Error(e),
        }
    }

    /// Tier 2: fetch the remote document stored under `id`.
    pub async fn tier_direct_fetch(&self, id: &CardId, slug: &str) -> TierOutcome<Resolution> {
        let collection = self.config.collection.as_str();
        let document = match self.remote_call(self.remote.fetch(collection, id)).await {
            Ok(Some(document)) => document,
            Ok(None) => return TierOutcome::Miss(MissReason::Absent),
            Err(e) => return TierOutcome::Error(e),
        };

        let record = match document.decode(collection) {
            Ok(record) => record,
            Err(e) => return TierOutcome::Error(e.into()),
        };

        match rejection(&record, slug) {
            Some(reason) => TierOutcome::Miss(reason),
            None => TierOutcome::Hit(remote_hit(document.id, record, Tier::DirectFetch)),
        }
    }

    /// Tier 3: query the remote collection for a published card with `slug`.
    ///
    /// The first document in store order that decodes and re-checks as
    /// published under `slug` wins.
    pub async fn tier_query(&self, slug: &str) -> TierOutcome<Resolution> {
        let collection = self.config.collection.as_str();
        let predicates = published_slug_query(slug);
        let documents = match self
            .remote_call(self.remote.query(collection, &predicates))
            .await
        {
            Ok(documents) => documents,
            Err(e) => return TierOutcome::Error(e),
        };

        if documents.is_empty() {
            return TierOutcome::Miss(MissReason::Absent);
        }
        if documents.len() > 1 {
            debug!(slug = %slug, count = documents.len(), "Query returned multiple cards, taking the first");
        }

        let mut first_rejection = None;
        let mut first_error = None;
        for document in documents {
            match document.decode(collection) {
                Ok(record) => match rejection(&record, slug) {
                    None => return TierOutcome::Hit(remote_hit(document.id, record, Tier::Query)),
                    Some(reason) => {
                        first_rejection.get_or_insert(reason);
                    }
                },
                Err(e) => {
                    warn!(id = %document.id, error = %e, "Skipping undecodable query result");
                    first_error.get_or_insert(CardlinkError::from(e));
                }
            }
        }

        match (first_rejection, first_error) {
            (Some(reason), _) => TierOutcome::Miss(reason),
            (None, Some(e)) => TierOutcome::Error(e),
            (None, None) => TierOutcome::Miss(MissReason::Absent),
        }
    }

    async fn read_cached<T>(&self, key: &CacheKey) -> Result<Option<T>, MissOrError>
    where
        T: serde::de::DeserializeOwned,
    {
        match entry::read(self.cache.as_ref(), key).await {
            Ok(value) => Ok(value),
            Err(CardlinkError::Cache(CacheError::Decode { key, reason })) => {
                debug!(key = %key, reason = %reason, "Unreadable cache entry");
                Err(MissOrError::Miss(MissReason::Incomplete))
            }
            Err(e) => Err(MissOrError::Error(e)),
        }
    }

    async fn remote_call<T, F>(&self, call: F) -> CardlinkResult<T>
    where
        F: Future<Output = CardlinkResult<T>>,
    {
        let timeout = self.config.remote_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
            .into()),
        }
    }
}

/// Cache reads either fail outright or yield an entry too damaged to use.
enum MissOrError {
    Miss(MissReason),
    Error(CardlinkError),
}

/// Why `record` may not be served for `slug`, if it may not.
fn rejection(record: &CardRecord, slug: &str) -> Option<MissReason> {
    if !record.card_status.is_published() {
        Some(MissReason::Unpublished)
    } else if record.card_slug != slug {
        Some(MissReason::SlugMismatch)
    } else {
        None
    }
}

fn remote_hit(id: CardId, record: CardRecord, source: Tier) -> Resolution {
    Resolution {
        cache_update: Some(CacheUpdate::new(id.clone(), record.clone())),
        id,
        record,
        source,
    }
}

/// Push the attempt onto the trace and hand back the hit, if any.
fn record_attempt(
    attempts: &mut Vec<TierAttempt>,
    tier: Tier,
    outcome: TierOutcome<Resolution>,
) -> Option<Resolution> {
    match &outcome {
        TierOutcome::Hit(_) => debug!(tier = %tier, "Tier hit"),
        TierOutcome::Miss(reason) => debug!(tier = %tier, reason = %reason, "Tier miss"),
        TierOutcome::Error(e) => warn!(tier = %tier, error = %e, "Tier failed, falling through"),
    }
    attempts.push(TierAttempt {
        tier,
        status: outcome.status(),
    });
    outcome.hit()
}
