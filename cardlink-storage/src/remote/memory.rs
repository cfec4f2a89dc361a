//! In-memory remote document store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use cardlink_core::{CardId, CardRecord, CardlinkResult, RemoteError};
use serde_json::Value;

use super::{FieldPredicate, RemoteDocument, RemoteDocumentStore};

type Collection = BTreeMap<CardId, Value>;

/// Document store held in memory, ordered by identifier within each
/// collection. Query results come back in identifier order.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<BTreeMap<String, Collection>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a raw document.
    pub fn insert(&self, collection: &str, id: CardId, data: Value) {
        if let Ok(mut collections) = self.collections.write() {
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id, data);
        }
    }

    /// Insert or replace a card document.
    pub fn insert_card(&self, collection: &str, id: CardId, record: &CardRecord) {
        // A CardRecord always serializes to a JSON object.
        if let Ok(data) = serde_json::to_value(record) {
            self.insert(collection, id, data);
        }
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }
}

#[async_trait]
impl RemoteDocumentStore for InMemoryDocumentStore {
    async fn fetch(&self, collection: &str, id: &CardId) -> CardlinkResult<Option<RemoteDocument>> {
        let collections = self.collections.read().map_err(|_| RemoteError::Unavailable {
            reason: "document store lock poisoned".to_string(),
        })?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| RemoteDocument::new(id.clone(), data.clone())))
    }

    async fn query(
        &self,
        collection: &str,
        predicates: &[FieldPredicate],
    ) -> CardlinkResult<Vec<RemoteDocument>> {
        let collections = self.collections.read().map_err(|_| RemoteError::QueryFailed {
            collection: collection.to_string(),
            reason: "document store lock poisoned".to_string(),
        })?;

        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .filter(|(_, data)| predicates.iter().all(|p| p.matches(data)))
            .map(|(id, data)| RemoteDocument::new(id.clone(), data.clone()))
            .collect())
    }
}
