//! Outbound DTOs emitted through the event dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event_order::EventOrder;

/// Payload of the "OrderedProcess" event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOrder {
    pub id: String,
    pub processing_id: String,
    pub service: String,
    pub source: String,
    pub provider: String,
    pub stage: String,
    pub input_id: String,
    pub payload: Value,
}

impl From<&EventOrder> for ProcessOrder {
    fn from(order: &EventOrder) -> Self {
        Self {
            id: order.id.clone(),
            processing_id: order.processing_id.clone(),
            service: order.service.clone(),
            source: order.source.clone(),
            provider: order.provider.clone(),
            stage: order.stage.clone(),
            input_id: order.input_id.clone(),
            payload: order.payload.clone(),
        }
    }
}

/// Payload of the "ErrorCreated" event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrMsg {
    pub cause: String,
    /// The bytes exactly as they were received
    pub raw_message: Vec<u8>,
    pub listener_tag: String,
    pub occurred_at: DateTime<Utc>,
}

impl ErrMsg {
    pub fn new(cause: impl Into<String>, raw_message: &[u8], listener_tag: &str) -> Self {
        Self {
            cause: cause.into(),
            raw_message: raw_message.to_vec(),
            listener_tag: listener_tag.to_string(),
            occurred_at: Utc::now(),
        }
    }
}
