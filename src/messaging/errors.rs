//! # Messaging Error Types
//!
//! Listener registry and consumer lifecycle errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    #[error("Listener not found: {tag}")]
    NotFound { tag: String },

    #[error("Listener already registered: {tag}")]
    AlreadyExists { tag: String },

    /// The consumer's message channel was already handed to a processor
    #[error("Message channel unavailable for listener: {tag}")]
    ChannelUnavailable { tag: String },

    #[error("Consumer is already consuming: {tag}")]
    AlreadyConsuming { tag: String },
}

impl ListenerError {
    pub fn tag(&self) -> &str {
        match self {
            ListenerError::NotFound { tag }
            | ListenerError::AlreadyExists { tag }
            | ListenerError::ChannelUnavailable { tag }
            | ListenerError::AlreadyConsuming { tag } => tag,
        }
    }
}

pub type ListenerResult<T> = std::result::Result<T, ListenerError>;
