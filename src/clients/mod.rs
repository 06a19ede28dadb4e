//! # Collaborator Clients
//!
//! Trait seams for the services the pipeline calls inline. The wire clients live
//! outside this crate; the pipeline only depends on these capabilities.
//!
//! | Capability            | Used for                                  |
//! |-----------------------|-------------------------------------------|
//! | [`Notifier`]          | publishing event payloads to the broker   |
//! | [`SchemaValidator`]   | validating input data against a schema    |
//! | [`DependencyLister`]  | configuration dependencies of a service   |
//! | [`InputStatusUpdater`]| writing status codes back onto an input   |
//!
//! All calls sit inside the sequential per-listener loop, so callers wrap them in
//! [`with_timeout`].

pub mod errors;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;

pub use errors::{ClientError, ClientResult};

/// (provider, service, source) triple identifying where an input came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceTuple {
    pub provider: String,
    pub service: String,
    pub source: String,
}

impl ServiceTuple {
    pub fn new(
        provider: impl Into<String>,
        service: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            service: service.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for ServiceTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.provider, self.service, self.source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    Input,
    Output,
    Configuration,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Input => "input",
            SchemaType::Output => "output",
            SchemaType::Configuration => "configuration",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration dependency declared for a service tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputStatus {
    pub code: u16,
    pub detail: String,
}

impl InputStatus {
    pub fn new(code: u16, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    pub fn invalid_schema() -> Self {
        Self::new(
            crate::constants::status::INVALID_SCHEMA_CODE,
            crate::constants::status::INVALID_SCHEMA_DETAIL,
        )
    }
}

/// Input record as returned by the input-status service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub id: String,
    pub provider: String,
    pub service: String,
    pub source: String,
    #[serde(default)]
    pub data: Value,
    pub status: InputStatus,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, body: Vec<u8>, routing_key: &str) -> ClientResult<()>;
}

#[async_trait]
pub trait SchemaValidator: Send + Sync {
    async fn validate_schema(
        &self,
        service: &ServiceTuple,
        schema_type: SchemaType,
        data: &Value,
    ) -> ClientResult<()>;
}

#[async_trait]
pub trait DependencyLister: Send + Sync {
    async fn list_dependencies(
        &self,
        provider: &str,
        service: &str,
        source: &str,
    ) -> ClientResult<Vec<Dependency>>;
}

#[async_trait]
pub trait InputStatusUpdater: Send + Sync {
    async fn update_input_status(&self, input_id: &str, status: InputStatus)
        -> ClientResult<Input>;
}

/// Bound a collaborator call, mapping expiry to [`ClientError::Timeout`]
pub async fn with_timeout<T, F>(operation: &str, budget: Duration, call: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    match tokio::time::timeout(budget, call).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout {
            operation: operation.to_string(),
            timeout_ms: budget.as_millis() as u64,
        }),
    }
}
