//! cardlink Core - Card Types
//!
//! Pure data structures with no I/O. All other crates depend on this.
//! Resolution logic lives in cardlink-storage.

pub mod card;
pub mod config;
pub mod error;
pub mod slug;
pub mod vcard;

pub use card::{CardProjection, CardRecord, PublishState, SocialLink, SocialNetwork};
pub use config::ResolverConfig;
pub use error::{
    CacheError, CardlinkError, CardlinkResult, ConfigError, RemoteError, ResolveError,
};
pub use slug::{identifier_suffix, is_blank_slug};
pub use vcard::{to_vcard, vcard_filename};

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Opaque storage key addressing a card in both the local cache and the
/// remote document store.
///
/// Identifiers are distinct from slugs. A slug usually ends with a short
/// suffix of its card's identifier, but nothing guarantees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this identifier equals `suffix` or ends with it.
    pub fn matches_suffix(&self, suffix: &str) -> bool {
        self.0 == suffix || self.0.ends_with(suffix)
    }

    /// Consume and return the raw identifier.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CardId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_matches_suffix() {
        let id = CardId::new("Xf29qabc123");
        assert!(id.matches_suffix("abc123"));
        assert!(id.matches_suffix("Xf29qabc123"));
        assert!(!id.matches_suffix("abc124"));
        assert!(!id.matches_suffix("ABC123"));
    }

    #[test]
    fn test_card_id_serializes_as_plain_string() {
        let id = CardId::new("xyz999");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"xyz999\"");

        let back: CardId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_card_id_display() {
        assert_eq!(CardId::from("abc123").to_string(), "abc123");
    }
}
