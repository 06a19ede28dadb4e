//! # System Constants
//!
//! Routing-key conventions, event names and fixed status codes shared by the
//! pre-processing pipeline and its downstream consumers. The routing-key formats are
//! a wire contract and must not change.

/// Event names understood by the dispatcher
pub mod events {
    pub const ORDERED_PROCESS: &str = "OrderedProcess";
    pub const ERROR_CREATED: &str = "ErrorCreated";
}

/// Routing keys published by and consumed from the broker
pub mod routing {
    /// Fixed queue every pre-processing failure is routed to
    pub const ERROR_CREATED_PRE_PROCESSING: &str = "error.created.pre-processing";

    /// `input.created.{provider}.{service}.{source}`
    pub fn input_created(provider: &str, service: &str, source: &str) -> String {
        format!("input.created.{provider}.{service}.{source}")
    }

    /// `input.pre-processed.{provider}.{service}.{source}`
    pub fn input_pre_processed(provider: &str, service: &str, source: &str) -> String {
        format!("input.pre-processed.{provider}.{service}.{source}")
    }
}

/// Input status codes written back to the input-status service
pub mod status {
    pub const INVALID_SCHEMA_CODE: u16 = 401;
    pub const INVALID_SCHEMA_DETAIL: &str = "invalid schema";
}

/// Stage label carried by every staged order
pub const PRE_PROCESSING_STAGE: &str = "pre-processing";

/// Collection holding in-flight event orders
pub const STAGING_COLLECTION: &str = "event_orders";

pub const DEFAULT_STORE_NAME: &str = "preprocessor";

/// Default budget for one inline collaborator call
pub const DEFAULT_COLLABORATOR_TIMEOUT_MS: u64 = 100;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5_000;
