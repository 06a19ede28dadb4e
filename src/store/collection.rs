//! # Collection
//!
//! A named, identity-keyed set of documents guarded by a single reader/writer lock.
//! Reads take the shared side, writes the exclusive side, and the lock is never held
//! across an `.await`, so a `parking_lot::RwLock` is used instead of the tokio one.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use super::document::{document_id, Document, ID_FIELD};
use super::errors::{StoreError, StoreResult};
use super::query;

#[derive(Debug)]
pub struct Collection {
    name: String,
    documents: RwLock<HashMap<String, Document>>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a new document keyed by its identity field.
    ///
    /// The duplicate check and the insert happen under one exclusive lock, which makes
    /// this the authoritative guard against concurrent inserts of the same identity.
    pub fn insert_one(&self, document: Document) -> StoreResult<String> {
        let id = document_id(&document).ok_or_else(|| StoreError::MissingIdentity {
            collection: self.name.clone(),
            field: ID_FIELD.to_string(),
        })?;

        let mut documents = self.documents.write();
        if documents.contains_key(&id) {
            return Err(StoreError::DuplicateKey {
                collection: self.name.clone(),
                id,
            });
        }
        documents.insert(id.clone(), document);

        debug!(collection = %self.name, id = %id, "Inserted document");
        Ok(id)
    }

    pub fn find_one(&self, id: &str) -> StoreResult<Document> {
        self.documents
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| self.not_found(id))
    }

    /// Snapshot of every document; iteration order is unspecified
    pub fn find_all(&self) -> Vec<Document> {
        self.documents.read().values().cloned().collect()
    }

    /// Every document that structurally contains `filter`
    pub fn find(&self, filter: &Document) -> Vec<Document> {
        self.documents
            .read()
            .values()
            .filter(|document| query::matches(document, filter))
            .cloned()
            .collect()
    }

    /// Shallow merge of `patch` into the stored document.
    ///
    /// Top-level fields are overwritten wholesale, nested objects included. The
    /// identity field is kept as stored so a patch can never re-key a document.
    pub fn update_one(&self, id: &str, patch: Document) -> StoreResult<Document> {
        let mut documents = self.documents.write();
        let document = documents.get_mut(id).ok_or_else(|| self.not_found(id))?;

        for (field, value) in patch {
            if field == ID_FIELD {
                continue;
            }
            document.insert(field, value);
        }

        Ok(document.clone())
    }

    pub fn delete_one(&self, id: &str) -> StoreResult<Document> {
        self.documents
            .write()
            .remove(id)
            .ok_or_else(|| self.not_found(id))
    }

    pub fn delete_all(&self) {
        let mut documents = self.documents.write();
        let removed = documents.len();
        documents.clear();
        debug!(collection = %self.name, removed = removed, "Cleared collection");
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn not_found(&self, id: &str) -> StoreError {
        StoreError::DocumentNotFound {
            collection: self.name.clone(),
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::document::from_value;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn doc(value: Value) -> Document {
        from_value(value).unwrap()
    }

    #[test]
    fn test_insert_then_find_one() {
        let collection = Collection::new("orders");
        let document = doc(json!({"_id": "k1", "service": "svc"}));

        let id = collection.insert_one(document.clone()).unwrap();
        assert_eq!(id, "k1");
        assert_eq!(collection.find_one("k1").unwrap(), document);
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let collection = Collection::new("orders");
        collection.insert_one(doc(json!({"_id": "k1"}))).unwrap();

        let err = collection
            .insert_one(doc(json!({"_id": "k1", "other": 1})))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateKey {
                collection: "orders".to_string(),
                id: "k1".to_string()
            }
        );
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_insert_without_identity_fails() {
        let collection = Collection::new("orders");
        let err = collection
            .insert_one(doc(json!({"service": "svc"})))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingIdentity { .. }));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_find_one_missing_is_not_found() {
        let collection = Collection::new("orders");
        let err = collection.find_one("nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_find_filters_structurally() {
        let collection = Collection::new("orders");
        collection
            .insert_one(doc(json!({"_id": "1", "provider": "p", "payload": {"k": "v"}})))
            .unwrap();
        collection
            .insert_one(doc(json!({"_id": "2", "provider": "p", "payload": {"k": "w"}})))
            .unwrap();
        collection
            .insert_one(doc(json!({"_id": "3", "provider": "q"})))
            .unwrap();

        assert_eq!(collection.find(&Document::new()).len(), 3);
        assert_eq!(collection.find(&doc(json!({"provider": "p"}))).len(), 2);

        let hits = collection.find(&doc(json!({"payload": {"k": "w"}})));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["_id"], "2");
    }

    #[test]
    fn test_update_is_shallow_merge() {
        let collection = Collection::new("orders");
        collection
            .insert_one(doc(json!({
                "_id": "1",
                "stage": "new",
                "payload": {"a": 1, "b": 2}
            })))
            .unwrap();

        let updated = collection
            .update_one(
                "1",
                doc(json!({"stage": "staged", "payload": {"c": 3}, "_id": "other"})),
            )
            .unwrap();

        assert_eq!(updated["stage"], "staged");
        assert_eq!(updated["payload"], json!({"c": 3}));
        assert_eq!(updated["_id"], "1");
        assert!(collection.find_one("other").is_err());
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let collection = Collection::new("orders");
        let err = collection.update_one("1", Document::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_one_and_delete_all() {
        let collection = Collection::new("orders");
        for i in 0..5 {
            collection.insert_one(doc(json!({"_id": i}))).unwrap();
        }

        collection.delete_one("3").unwrap();
        assert!(collection.delete_one("3").unwrap_err().is_not_found());
        assert_eq!(collection.len(), 4);

        collection.delete_all();
        assert!(collection.find_all().is_empty());

        // Always succeeds, even when already empty
        collection.delete_all();
        assert!(collection.is_empty());
    }

    #[test]
    fn test_concurrent_inserts_of_same_identity_admit_one() {
        let collection = Arc::new(Collection::new("orders"));
        let handles: Vec<_> = (0..16)
            .map(|worker| {
                let collection = collection.clone();
                std::thread::spawn(move || {
                    collection
                        .insert_one(doc(json!({"_id": "same", "worker": worker})))
                        .is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(collection.len(), 1);
    }
}
