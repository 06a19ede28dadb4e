//! # Event Order
//!
//! Staging record for one message while it moves through pre-processing.
//!
//! Both identifiers are derived from the same `(service, source, provider, payload)`
//! tuple but with unrelated schemes: the identity is a 64-bit SipHash used as the
//! staging key, while the processing id is a UUID v5 handed to downstream consumers
//! for correlation. Equal tuples therefore always collide on the identity, which is
//! what lets the store reject a duplicate in-flight message.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use crate::constants::PRE_PROCESSING_STAGE;
use crate::error::{PipelineError, PipelineResult};
use crate::messaging::InputMessage;
use crate::store::{Document, DocumentCodec, StoreError, StoreResult, ID_FIELD};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOrder {
    pub id: String,
    pub service: String,
    pub source: String,
    pub provider: String,
    pub stage: String,
    pub processing_id: String,
    pub input_id: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl EventOrder {
    /// Build a staging record, deriving both identifiers.
    ///
    /// An explicit `processing_id` (a correlation id carried by the message) takes
    /// precedence over the derived one. Fails when service, source or provider is
    /// empty or when the payload is missing (`null`); an empty object is a payload.
    pub fn new(
        service: &str,
        source: &str,
        provider: &str,
        payload: Value,
        input_id: &str,
        processing_id: Option<&str>,
    ) -> PipelineResult<Self> {
        for (field, value) in [("service", service), ("source", source), ("provider", provider)]
        {
            if value.trim().is_empty() {
                return Err(PipelineError::InvalidEventOrder(format!(
                    "{field} must not be empty"
                )));
            }
        }
        if payload.is_null() {
            return Err(PipelineError::InvalidEventOrder(
                "payload must not be empty".to_string(),
            ));
        }

        let id = Self::generate_identity_hash(service, source, provider, &payload);
        let processing_id = match processing_id.filter(|p| !p.trim().is_empty()) {
            Some(explicit) => explicit.to_string(),
            None => Self::generate_processing_id(service, source, provider, &payload),
        };

        Ok(Self {
            id,
            service: service.to_string(),
            source: source.to_string(),
            provider: provider.to_string(),
            stage: PRE_PROCESSING_STAGE.to_string(),
            processing_id,
            input_id: input_id.to_string(),
            payload,
            created_at: Utc::now(),
        })
    }

    pub fn from_message(message: &InputMessage) -> PipelineResult<Self> {
        Self::new(
            &message.service,
            &message.source,
            &message.provider,
            message.data.clone(),
            &message.id,
            message.processing_id.as_deref(),
        )
    }

    /// Deterministic staging key for a message tuple.
    ///
    /// `serde_json` keeps object keys sorted, so logically equal payloads render to
    /// the same string regardless of the key order they arrived in.
    pub fn generate_identity_hash(
        service: &str,
        source: &str,
        provider: &str,
        payload: &Value,
    ) -> String {
        let mut hasher = DefaultHasher::new();
        service.hash(&mut hasher);
        source.hash(&mut hasher);
        provider.hash(&mut hasher);
        payload.to_string().hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    pub fn generate_processing_id(
        service: &str,
        source: &str,
        provider: &str,
        payload: &Value,
    ) -> String {
        let name = format!("{provider}/{service}/{source}/{payload}");
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
    }
}

fn required_str(document: &Document, field: &str) -> StoreResult<String> {
    match document.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(StoreError::codec(
            EventOrder::ENTITY,
            format!("field '{field}' must be a string, got {other}"),
        )),
        None => Err(StoreError::codec(
            EventOrder::ENTITY,
            format!("missing field '{field}'"),
        )),
    }
}

impl DocumentCodec for EventOrder {
    const ENTITY: &'static str = "EventOrder";

    fn identity(&self) -> &str {
        &self.id
    }

    fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        document.insert("service".to_string(), Value::String(self.service.clone()));
        document.insert("source".to_string(), Value::String(self.source.clone()));
        document.insert("provider".to_string(), Value::String(self.provider.clone()));
        document.insert("stage".to_string(), Value::String(self.stage.clone()));
        document.insert(
            "processing_id".to_string(),
            Value::String(self.processing_id.clone()),
        );
        document.insert("input_id".to_string(), Value::String(self.input_id.clone()));
        document.insert("payload".to_string(), self.payload.clone());
        document.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );
        document
    }

    fn from_document(document: &Document) -> StoreResult<Self> {
        let created_at = required_str(document, "created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| StoreError::codec(Self::ENTITY, format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(Self {
            id: required_str(document, ID_FIELD)?,
            service: required_str(document, "service")?,
            source: required_str(document, "source")?,
            provider: required_str(document, "provider")?,
            stage: required_str(document, "stage")?,
            processing_id: required_str(document, "processing_id")?,
            input_id: required_str(document, "input_id")?,
            payload: document.get("payload").cloned().unwrap_or(Value::Null),
            created_at,
        })
    }
}
