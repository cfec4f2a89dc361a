//! Card-shaped access to the byte-oriented cache.
//!
//! Records and projections are stored as JSON under their namespaced keys.
//! The two halves of a card entry are written and read independently; only
//! the lookup engine decides whether a pair is trustworthy.

use cardlink_core::{CacheError, CardId, CardProjection, CardRecord, CardlinkResult};
use serde::{de::DeserializeOwned, Serialize};

use super::key::CacheKey;
use super::traits::LocalCacheStore;

/// Serialize a cache value.
pub fn encode<T: Serialize>(key: &CacheKey, value: &T) -> CardlinkResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        CacheError::Encode {
            key: key.encode(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Deserialize a cache value.
pub fn decode<T: DeserializeOwned>(key: &CacheKey, bytes: &[u8]) -> CardlinkResult<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        CacheError::Decode {
            key: key.encode(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Read and decode a single cache value. Absent keys are `Ok(None)`.
pub async fn read<T, C>(store: &C, key: &CacheKey) -> CardlinkResult<Option<T>>
where
    T: DeserializeOwned,
    C: LocalCacheStore + ?Sized,
{
    match store.get(&key.encode()).await? {
        Some(bytes) => decode(key, &bytes).map(Some),
        None => Ok(None),
    }
}

/// Instruction to populate the cache after a remote hit.
///
/// The lookup engine never writes the cache itself. It hands one of these
/// back with the resolved record and the caller decides whether to apply it.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheUpdate {
    /// Identifier the entry is stored under.
    pub id: CardId,
    /// Full record for `profile_<id>`.
    pub record: CardRecord,
    /// Projection for `card_data_<id>`.
    pub projection: CardProjection,
}

impl CacheUpdate {
    /// Build the update for `record` stored under `id`.
    pub fn new(id: CardId, record: CardRecord) -> Self {
        let projection = record.projection();
        Self {
            id,
            record,
            projection,
        }
    }

    /// Encoded `(key, value)` pairs, full record first.
    pub fn entries(&self) -> CardlinkResult<Vec<(String, Vec<u8>)>> {
        let profile_key = CacheKey::profile(&self.id);
        let card_data_key = CacheKey::card_data(&self.id);

        Ok(vec![
            (profile_key.encode(), encode(&profile_key, &self.record)?),
            (card_data_key.encode(), encode(&card_data_key, &self.projection)?),
        ])
    }

    /// Write both halves of the entry to `store`.
    ///
    /// Not atomic across the two keys. A failure after the first write
    /// leaves a lone `profile_<id>`, which the engine treats as a miss.
    pub async fn apply<C: LocalCacheStore + ?Sized>(&self, store: &C) -> CardlinkResult<()> {
        for (key, value) in self.entries()? {
            store.set(&key, value).await?;
        }
        Ok(())
    }
}
