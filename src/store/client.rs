//! # Store Client
//!
//! Typed façade over one collection. Entities describe their own document shape
//! through [`DocumentCodec`]; the client never inspects types at runtime.

use std::marker::PhantomData;
use std::sync::Arc;

use super::collection::Collection;
use super::document::Document;
use super::document_store::DocumentStore;
use super::errors::StoreResult;

/// Explicit entity ↔ document conversion
pub trait DocumentCodec: Sized {
    /// Entity name used in codec errors
    const ENTITY: &'static str;

    /// Identity under which the entity is stored
    fn identity(&self) -> &str;

    /// Encode into a document carrying the identity field
    fn to_document(&self) -> Document;

    /// Decode a stored document
    fn from_document(document: &Document) -> StoreResult<Self>;
}

pub struct StoreClient<E> {
    collection: Arc<Collection>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for StoreClient<E> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for StoreClient<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("collection", &self.collection.name())
            .finish()
    }
}

impl<E: DocumentCodec> StoreClient<E> {
    pub fn new(collection: Arc<Collection>) -> Self {
        Self {
            collection,
            _entity: PhantomData,
        }
    }

    /// Bind to an existing collection of `store`
    pub fn for_collection(store: &DocumentStore, name: &str) -> StoreResult<Self> {
        Ok(Self::new(store.get_collection(name)?))
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    pub fn insert(&self, entity: &E) -> StoreResult<String> {
        self.collection.insert_one(entity.to_document())
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<E> {
        E::from_document(&self.collection.find_one(id)?)
    }

    pub fn find_all(&self) -> StoreResult<Vec<E>> {
        self.collection
            .find_all()
            .iter()
            .map(E::from_document)
            .collect()
    }

    pub fn find(&self, query: &Document) -> StoreResult<Vec<E>> {
        self.collection
            .find(query)
            .iter()
            .map(E::from_document)
            .collect()
    }

    pub fn update(&self, id: &str, patch: Document) -> StoreResult<E> {
        E::from_document(&self.collection.update_one(id, patch)?)
    }

    pub fn delete(&self, id: &str) -> StoreResult<E> {
        E::from_document(&self.collection.delete_one(id)?)
    }

    pub fn delete_all(&self) {
        self.collection.delete_all();
    }
}
