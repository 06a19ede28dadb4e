//! # In-Memory Document Store
//!
//! Thread-safe, schema-less storage used to stage in-flight records.
//!
//! ## Architecture
//!
//! ```text
//! DocumentStore                (DashMap: name → Arc<Collection>)
//! └── Collection               (RwLock: identity → Document)
//!     └── StoreClient<E>       (typed façade via DocumentCodec)
//! ```
//!
//! Nothing here is persisted; dropping the store drops every document.

pub mod client;
pub mod collection;
pub mod document;
pub mod document_store;
pub mod errors;
pub mod query;

pub use client::{DocumentCodec, StoreClient};
pub use collection::Collection;
pub use document::{document_id, Document, ID_FIELD};
pub use document_store::DocumentStore;
pub use errors::{StoreError, StoreResult};
