//! Namespaced cache keys.
//!
//! Every card occupies two keys in the local cache: `profile_<id>` for the
//! full record blob and `card_data_<id>` for the `{cardStatus, cardSlug}`
//! projection. A `CacheKey` can only be built from a [`CardId`] and a
//! [`CacheKind`], so code never formats the namespaces by hand.

use cardlink_core::CardId;

/// Prefix of full-record keys.
pub const PROFILE_PREFIX: &str = "profile_";

/// Prefix of projection keys.
pub const CARD_DATA_PREFIX: &str = "card_data_";

/// Which of the two co-located records a key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// Full [`cardlink_core::CardRecord`] blob.
    Profile,
    /// [`cardlink_core::CardProjection`].
    CardData,
}

impl CacheKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Profile => PROFILE_PREFIX,
            Self::CardData => CARD_DATA_PREFIX,
        }
    }
}

/// A cache key in one of the two card namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: CacheKind,
    id: CardId,
}

impl CacheKey {
    pub fn new(kind: CacheKind, id: CardId) -> Self {
        Self { kind, id }
    }

    /// Key of the full record blob for `id`.
    pub fn profile(id: &CardId) -> Self {
        Self::new(CacheKind::Profile, id.clone())
    }

    /// Key of the projection for `id`.
    pub fn card_data(id: &CardId) -> Self {
        Self::new(CacheKind::CardData, id.clone())
    }

    pub fn kind(&self) -> CacheKind {
        self.kind
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    /// Encode to the store's string key.
    pub fn encode(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.id)
    }

    /// Decode a store key.
    ///
    /// Returns `None` for keys outside both namespaces and for keys with an
    /// empty identifier. Keys that are not ours are expected: the store may
    /// be shared with other data.
    pub fn decode(raw: &str) -> Option<Self> {
        let (kind, id) = if let Some(id) = raw.strip_prefix(CARD_DATA_PREFIX) {
            (CacheKind::CardData, id)
        } else if let Some(id) = raw.strip_prefix(PROFILE_PREFIX) {
            (CacheKind::Profile, id)
        } else {
            return None;
        };

        if id.is_empty() {
            return None;
        }

        Some(Self::new(kind, CardId::new(id)))
    }
}
