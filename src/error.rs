//! Error types for the pre-processing core.
//!
//! Each area owns a `thiserror` enum close to the code that raises it; this module
//! ties them together into [`PipelineError`] for callers that cross module lines.

use thiserror::Error;

pub use crate::clients::ClientError;
pub use crate::config::ConfigurationError;
pub use crate::events::DispatchError;
pub use crate::messaging::ListenerError;
pub use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("Listener error: {0}")]
    Listener(#[from] ListenerError),
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Invalid event order: {0}")]
    InvalidEventOrder(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(error: serde_json::Error) -> Self {
        PipelineError::Serialization(error.to_string())
    }
}

impl PipelineError {
    /// True for every "missing thing" variant across the taxonomy
    pub fn is_not_found(&self) -> bool {
        match self {
            PipelineError::Store(e) => e.is_not_found(),
            PipelineError::Listener(ListenerError::NotFound { .. }) => true,
            PipelineError::Client(ClientError::NotFound { .. }) => true,
            _ => false,
        }
    }

    /// True for duplicate/already-present variants across the taxonomy
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            PipelineError::Store(StoreError::CollectionAlreadyExists { .. })
                | PipelineError::Store(StoreError::DuplicateKey { .. })
                | PipelineError::Dispatch(DispatchError::AlreadyRegistered { .. })
                | PipelineError::Listener(ListenerError::AlreadyExists { .. })
        )
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
