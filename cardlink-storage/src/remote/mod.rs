//! Remote document store abstraction.
//!
//! The remote store is the source of truth for cards: a keyed document
//! store supporting fetch-by-identifier and equality-predicate queries.
//! Documents are untyped JSON here; decoding into [`CardRecord`] happens at
//! the lookup tiers so a malformed document is a tier error, not a panic.

pub mod memory;

pub use memory::InMemoryDocumentStore;

use async_trait::async_trait;
use cardlink_core::{CardId, CardRecord, CardlinkResult, PublishState, RemoteError};
use serde_json::Value;

/// Document field holding the card slug.
pub const FIELD_CARD_SLUG: &str = "cardSlug";

/// Document field holding the publish state.
pub const FIELD_CARD_STATUS: &str = "cardStatus";

/// A document as returned by the remote store.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    /// Store-assigned identifier.
    pub id: CardId,
    /// Document body.
    pub data: Value,
}

impl RemoteDocument {
    pub fn new(id: CardId, data: Value) -> Self {
        Self { id, data }
    }

    /// Decode the body into a card record.
    pub fn decode(&self, collection: &str) -> Result<CardRecord, RemoteError> {
        serde_json::from_value(self.data.clone()).map_err(|e| RemoteError::InvalidDocument {
            collection: collection.to_string(),
            id: self.id.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Field equality predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub field: String,
    pub value: Value,
}

impl FieldPredicate {
    /// `field == value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when `document` has `field` equal to `value`.
    pub fn matches(&self, document: &Value) -> bool {
        document.get(&self.field) == Some(&self.value)
    }
}

/// Predicates selecting the published card carrying `slug`.
pub fn published_slug_query(slug: &str) -> Vec<FieldPredicate> {
    vec![
        FieldPredicate::eq(FIELD_CARD_SLUG, slug),
        FieldPredicate::eq(FIELD_CARD_STATUS, PublishState::Published.as_str()),
    ]
}

/// Remote document store consumed by the lookup tiers.
///
/// Implementations report absence as `Ok(None)` / an empty `Vec`; errors are
/// reserved for failures to answer at all (network, permissions, quota).
#[async_trait]
pub trait RemoteDocumentStore: Send + Sync {
    /// Fetch a document by identifier.
    async fn fetch(&self, collection: &str, id: &CardId) -> CardlinkResult<Option<RemoteDocument>>;

    /// Documents matching every predicate, in the store's native order.
    async fn query(
        &self,
        collection: &str,
        predicates: &[FieldPredicate],
    ) -> CardlinkResult<Vec<RemoteDocument>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_predicate_matches_exact_value() {
        let doc = json!({ "cardSlug": "jane-smith-xyz999", "cardStatus": "Published" });
        assert!(FieldPredicate::eq(FIELD_CARD_SLUG, "jane-smith-xyz999").matches(&doc));
        assert!(!FieldPredicate::eq(FIELD_CARD_SLUG, "Jane-Smith-xyz999").matches(&doc));
        assert!(!FieldPredicate::eq("missing", "x").matches(&doc));
    }

    #[test]
    fn test_published_slug_query() {
        let predicates = published_slug_query("jane-smith-xyz999");
        assert_eq!(predicates.len(), 2);
        assert_eq!(predicates[1], FieldPredicate::eq("cardStatus", "Published"));

        let draft = json!({ "cardSlug": "jane-smith-xyz999", "cardStatus": "Draft" });
        assert!(!predicates.iter().all(|p| p.matches(&draft)));
    }

    #[test]
    fn test_decode_invalid_document() {
        let doc = RemoteDocument::new(CardId::new("bad"), json!({ "cardStatus": 42 }));
        let err = doc.decode("users").unwrap_err();
        assert!(matches!(err, RemoteError::InvalidDocument { ref id, .. } if id == "bad"));
    }
}
