//! # Document Store
//!
//! Named set of collections. Each collection carries its own lock; the store-level
//! map is a `DashMap` so that creating or dropping one collection never blocks
//! readers of another.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

use super::collection::Collection;
use super::errors::{StoreError, StoreResult};
use crate::logging::log_store_operation;

#[derive(Debug)]
pub struct DocumentStore {
    name: String,
    collections: DashMap<String, Arc<Collection>>,
}

impl DocumentStore {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        info!(store = %name, "Created in-memory document store");
        Self {
            name,
            collections: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create an empty collection, failing if the name is taken
    pub fn create_collection(&self, name: &str) -> StoreResult<Arc<Collection>> {
        match self.collections.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::CollectionAlreadyExists {
                name: name.to_string(),
            }),
            Entry::Vacant(vacant) => {
                let collection = Arc::new(Collection::new(name));
                vacant.insert(collection.clone());
                log_store_operation("create_collection", &self.name, name, "created", None);
                Ok(collection)
            }
        }
    }

    /// Remove a collection and everything in it.
    ///
    /// Outstanding `Arc<Collection>` handles stay usable but are detached from the
    /// store.
    pub fn drop_collection(&self, name: &str) -> StoreResult<()> {
        match self.collections.remove(name) {
            Some((_, collection)) => {
                let details = format!("{} documents discarded", collection.len());
                log_store_operation("drop_collection", &self.name, name, "dropped", Some(&details));
                Ok(())
            }
            None => Err(StoreError::CollectionNotFound {
                name: name.to_string(),
            }),
        }
    }

    pub fn get_collection(&self, name: &str) -> StoreResult<Arc<Collection>> {
        self.collections
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::CollectionNotFound {
                name: name.to_string(),
            })
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_STORE_NAME)
    }
}
