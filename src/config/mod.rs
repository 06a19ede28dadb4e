//! # Configuration
//!
//! Typed configuration for the pre-processing service. Every section has defaults,
//! so an empty source yields a runnable configuration; [`ConfigLoader`] layers an
//! optional TOML file and `PREPROCESSOR__*` environment variables on top.
//!
//! ```toml
//! environment = "production"
//!
//! [store]
//! name = "preprocessor"
//! staging_collection = "event_orders"
//!
//! [[listeners]]
//! name = "pre-processing"
//! queue = "pre-processing-inputs"
//! routing_key = "input.created.#"
//! channel_capacity = 256
//!
//! [collaborators]
//! timeout_ms = 100
//!
//! [server]
//! shutdown_timeout_ms = 5000
//!
//! [logging]
//! json = true
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_COLLABORATOR_TIMEOUT_MS, DEFAULT_SHUTDOWN_TIMEOUT_MS,
    DEFAULT_STORE_NAME, STAGING_COLLECTION,
};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::{detect_environment, ConfigLoader};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub environment: String,
    pub store: StoreConfig,
    pub listeners: Vec<ListenerConfig>,
    pub collaborators: CollaboratorConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            environment: detect_environment(),
            store: StoreConfig::default(),
            listeners: vec![ListenerConfig::default()],
            collaborators: CollaboratorConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "store.name",
                &self.store.name,
                "store name must not be empty",
            ));
        }
        if self.store.staging_collection.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "store.staging_collection",
                &self.store.staging_collection,
                "staging collection name must not be empty",
            ));
        }
        if self.collaborators.timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "collaborators.timeout_ms",
                0,
                "collaborator calls need a non-zero budget",
            ));
        }
        if self.server.shutdown_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "server.shutdown_timeout_ms",
                0,
                "shutdown timeout must be non-zero",
            ));
        }

        let mut tags = HashSet::new();
        for (index, listener) in self.listeners.iter().enumerate() {
            listener.validate(index)?;
            if !tags.insert(listener.tag()) {
                return Err(ConfigurationError::invalid_value(
                    format!("listeners[{index}]"),
                    listener.tag(),
                    "duplicate listener tag",
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name: String,
    pub staging_collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_STORE_NAME.to_string(),
            staging_collection: STAGING_COLLECTION.to_string(),
        }
    }
}

/// One broker binding: a consumer name, the queue it reads and its routing key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    pub name: String,
    pub queue: String,
    pub routing_key: String,
    /// Bound of the delivery → processor channel
    pub channel_capacity: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            name: "pre-processing".to_string(),
            queue: "pre-processing-inputs".to_string(),
            routing_key: "input.created.#".to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ListenerConfig {
    pub fn new(
        name: impl Into<String>,
        queue: impl Into<String>,
        routing_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            queue: queue.into(),
            routing_key: routing_key.into(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// `{name}:{queue}:{routing_key}`, unique per registry
    pub fn tag(&self) -> String {
        format!("{}:{}:{}", self.name, self.queue, self.routing_key)
    }

    fn validate(&self, index: usize) -> ConfigResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("queue", &self.queue),
            ("routing_key", &self.routing_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigurationError::invalid_value(
                    format!("listeners[{index}].{field}"),
                    value,
                    "must not be empty",
                ));
            }
        }
        if self.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                format!("listeners[{index}].channel_capacity"),
                0,
                "channel capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    pub timeout_ms: u64,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_COLLABORATOR_TIMEOUT_MS,
        }
    }
}

impl CollaboratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub shutdown_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
        }
    }
}

impl ServerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Explicit filter directive; derived from the environment when unset
    pub level: Option<String>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}
