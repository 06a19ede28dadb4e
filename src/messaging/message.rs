//! # Inbound Message Structures
//!
//! Shape of the `input.created.*` messages a listener hands to the orchestrator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::routing;

/// An input announced by the inputs service
///
/// Missing fields deserialize to empty values; whether they are usable is decided
/// when the staging record is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputMessage {
    /// Id of the input record, used for status updates
    pub id: String,
    pub provider: String,
    pub service: String,
    pub source: String,
    pub data: Value,
    /// Correlation id carried over from an earlier stage, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_id: Option<String>,
}

impl InputMessage {
    pub fn new(
        id: impl Into<String>,
        provider: impl Into<String>,
        service: impl Into<String>,
        source: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            service: service.into(),
            source: source.into(),
            data,
            processing_id: None,
        }
    }

    /// Parse raw delivery bytes
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Routing key this input was announced under
    pub fn routing_key(&self) -> String {
        routing::input_created(&self.provider, &self.service, &self.source)
    }
}
