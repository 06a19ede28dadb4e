//! Configuration Error Types
//!
//! Errors raised while loading and validating [`PipelineConfig`](super::PipelineConfig).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A source could not be read or parsed
    #[error("Failed to load configuration from {origin}: {reason}")]
    Load { origin: String, reason: String },

    /// The merged configuration does not fit the expected shape
    #[error("Failed to deserialize configuration: {reason}")]
    Deserialize { reason: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },
}

impl ConfigurationError {
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl ToString,
        context: impl Into<String>,
    ) -> Self {
        ConfigurationError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            context: context.into(),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;
