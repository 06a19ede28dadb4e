//! # Collaborator Error Types

use thiserror::Error;

/// Failures reported by external collaborators (schema, dependency, input-status
/// and broker services)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Dependency lookup failed for {service_tuple}: {reason}")]
    DependencyLookup {
        service_tuple: String,
        reason: String,
    },

    #[error("Transport error calling {service}: {reason}")]
    Transport { service: String, reason: String },

    #[error("Operation {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },
}

impl ClientError {
    pub fn transport(service: &str, reason: impl Into<String>) -> Self {
        ClientError::Transport {
            service: service.to_string(),
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        ClientError::Validation {
            reason: reason.into(),
        }
    }

    /// Whether the collaborator answered and rejected the request, as opposed to
    /// not answering at all
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ClientError::Validation { .. } | ClientError::NotFound { .. }
        )
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
