//! # Staging Repository
//!
//! Persists in-flight [`EventOrder`]s in the document store for the duration of one
//! processing attempt.
//!
//! ## Duplicate handling
//!
//! `create` does not look for an existing record first. The collection's insert
//! checks and inserts under one exclusive lock, so two concurrent attempts for the
//! same identity are resolved there: exactly one succeeds, the other gets
//! `StoreError::DuplicateKey`.

use tracing::debug;

use crate::models::EventOrder;
use crate::store::{Document, DocumentStore, StoreClient, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct StagingRepository {
    client: StoreClient<EventOrder>,
}

impl StagingRepository {
    /// Bind to (creating if needed) the staging collection `collection` of `store`.
    ///
    /// A collection left over from an earlier repository instance is reused rather
    /// than treated as an error, so constructing the repository is idempotent.
    pub fn new(store: &DocumentStore, collection: &str) -> StoreResult<Self> {
        let collection = match store.create_collection(collection) {
            Ok(created) => created,
            Err(StoreError::CollectionAlreadyExists { name }) => {
                debug!(collection = %name, "Reusing existing staging collection");
                store.get_collection(&name)?
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            client: StoreClient::new(collection),
        })
    }

    /// Stage an order; fails with `DuplicateKey` if its identity is already staged
    pub fn create(&self, order: &EventOrder) -> StoreResult<()> {
        self.client.insert(order)?;
        debug!(
            order_id = %order.id,
            processing_id = %order.processing_id,
            "Staged event order"
        );
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<EventOrder> {
        self.client.find_by_id(id)
    }

    pub fn find_all(&self) -> StoreResult<Vec<EventOrder>> {
        self.client.find_all()
    }

    pub fn find(&self, query: &Document) -> StoreResult<Vec<EventOrder>> {
        self.client.find(query)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.client.delete(id)?;
        debug!(order_id = %id, "Unstaged event order");
        Ok(())
    }

    pub fn collection_name(&self) -> &str {
        self.client.collection_name()
    }
}
