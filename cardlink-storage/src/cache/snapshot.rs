//! Point-in-time view of which cards the local cache knows about.
//!
//! Loading a snapshot is the only cache enumeration a resolution performs.
//! Everything the slug resolver needs is decoded here up front so that
//! identifier derivation itself is a pure function.

use cardlink_core::{CardId, CardProjection, CardlinkResult};

use super::entry;
use super::key::{CacheKey, CacheKind};
use super::traits::LocalCacheStore;

/// What the cache holds for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub id: CardId,
    /// Whether a `profile_<id>` key exists. Its contents are not read.
    pub has_profile: bool,
    /// Decoded `card_data_<id>`, if present and decodable.
    pub projection: Option<CardProjection>,
}

/// Cached identifiers in enumeration order, with their projections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    entries: Vec<SnapshotEntry>,
}

impl CacheSnapshot {
    /// An empty snapshot, as seen on a fresh device.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Enumerate `store` and decode every projection.
    ///
    /// Identifiers appear in the order their first key is enumerated.
    /// Undecodable projections are treated as absent. Only a failure to
    /// enumerate the store is an error.
    pub async fn load<C: LocalCacheStore + ?Sized>(store: &C) -> CardlinkResult<Self> {
        let keys = store.list_keys().await?;
        let mut snapshot = Self::default();

        for key in keys.iter().filter_map(|raw| CacheKey::decode(raw)) {
            match key.kind() {
                CacheKind::Profile => snapshot.entry_mut(key.id()).has_profile = true,
                CacheKind::CardData => {
                    let projection = match entry::read::<CardProjection, _>(store, &key).await {
                        Ok(projection) => projection,
                        Err(e) => {
                            tracing::debug!(key = %key.encode(), error = %e, "Skipping unreadable card projection");
                            None
                        }
                    };
                    snapshot.entry_mut(key.id()).projection = projection;
                }
            }
        }

        Ok(snapshot)
    }

    /// Build a snapshot directly from entries, in the given order.
    pub fn from_entries(entries: impl IntoIterator<Item = SnapshotEntry>) -> Self {
        let mut snapshot = Self::default();
        for entry in entries {
            let slot = snapshot.entry_mut(&entry.id);
            slot.has_profile |= entry.has_profile;
            if entry.projection.is_some() {
                slot.projection = entry.projection;
            }
        }
        snapshot
    }

    /// All known identifiers with their cached data.
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Identifiers with a decodable projection, in enumeration order.
    pub fn projections(&self) -> impl Iterator<Item = (&CardId, &CardProjection)> {
        self.entries
            .iter()
            .filter_map(|e| e.projection.as_ref().map(|p| (&e.id, p)))
    }

    /// Every known identifier, in enumeration order.
    pub fn ids(&self) -> impl Iterator<Item = &CardId> {
        self.entries.iter().map(|e| &e.id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn entry_mut(&mut self, id: &CardId) -> &mut SnapshotEntry {
        // Linear scan keeps enumeration order; device caches hold a handful
        // of cards.
        let index = match self.entries.iter().position(|e| &e.id == id) {
            Some(index) => index,
            None => {
                self.entries.push(SnapshotEntry {
                    id: id.clone(),
                    has_profile: false,
                    projection: None,
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheStore;
    use cardlink_core::PublishState;

    #[tokio::test]
    async fn test_load_groups_keys_by_identifier() {
        let store = InMemoryCacheStore::new();
        let projection = CardProjection::new("john-doe-abc123", PublishState::Published);
        store
            .set("card_data_abc123", serde_json::to_vec(&projection).unwrap())
            .await
            .unwrap();
        store.set("profile_abc123", b"{}".to_vec()).await.unwrap();
        store.set("profile_zzz000", b"{}".to_vec()).await.unwrap();
        store.set("theme", b"dark".to_vec()).await.unwrap();

        let snapshot = CacheSnapshot::load(&store).await.unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.entries()[0],
            SnapshotEntry {
                id: CardId::new("abc123"),
                has_profile: true,
                projection: Some(projection),
            }
        );
        assert_eq!(
            snapshot.entries()[1],
            SnapshotEntry {
                id: CardId::new("zzz000"),
                has_profile: true,
                projection: None,
            }
        );
    }

    #[tokio::test]
    async fn test_load_skips_unreadable_projection() {
        let store = InMemoryCacheStore::new();
        store.set("card_data_abc123", b"{broken".to_vec()).await.unwrap();

        let snapshot = CacheSnapshot::load(&store).await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.projections().count(), 0);
    }

    #[tokio::test]
    async fn test_load_keeps_projection_with_unknown_status() {
        let store = InMemoryCacheStore::new();
        store
            .set(
                "card_data_abc123",
                br#"{"cardStatus":"Archived","cardSlug":"john-doe-abc123"}"#.to_vec(),
            )
            .await
            .unwrap();

        let snapshot = CacheSnapshot::load(&store).await.unwrap();
        let (_, projection) = snapshot.projections().next().unwrap();
        assert_eq!(projection.card_status, PublishState::Draft);
        assert_eq!(projection.card_slug, "john-doe-abc123");
    }

    #[tokio::test]
    async fn test_load_empty_store() {
        let snapshot = CacheSnapshot::load(&InMemoryCacheStore::new()).await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot, CacheSnapshot::empty());
    }

    #[test]
    fn test_from_entries_merges_duplicates() {
        let snapshot = CacheSnapshot::from_entries([
            SnapshotEntry {
                id: CardId::new("a"),
                has_profile: true,
                projection: None,
            },
            SnapshotEntry {
                id: CardId::new("a"),
                has_profile: false,
                projection: Some(CardProjection::new("x-a", PublishState::Draft)),
            },
        ]);

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.entries()[0].has_profile);
        assert!(snapshot.entries()[0].projection.is_some());
    }
}
