//! # Store Error Types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Collection '{name}' not found")]
    CollectionNotFound { name: String },

    #[error("Collection '{name}' already exists")]
    CollectionAlreadyExists { name: String },

    #[error("Document '{id}' not found in collection '{collection}'")]
    DocumentNotFound { collection: String, id: String },

    #[error("Document is missing identity field '{field}' in collection '{collection}'")]
    MissingIdentity { collection: String, field: String },

    #[error("Duplicate key '{id}' in collection '{collection}'")]
    DuplicateKey { collection: String, id: String },

    #[error("Document codec error for {entity}: {reason}")]
    Codec { entity: String, reason: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::CollectionNotFound { .. } | StoreError::DocumentNotFound { .. }
        )
    }

    pub fn codec(entity: &str, reason: impl Into<String>) -> Self {
        StoreError::Codec {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
