//! Closed set of events the pipeline emits.

use std::fmt;

use crate::constants::events::{ERROR_CREATED, ORDERED_PROCESS};
use crate::models::{ErrMsg, ProcessOrder};

/// Registration key for handlers; one per [`Event`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    OrderedProcess,
    ErrorCreated,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::OrderedProcess => ORDERED_PROCESS,
            EventKind::ErrorCreated => ERROR_CREATED,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A message passed pre-processing and is ready for downstream processing
    OrderedProcess(ProcessOrder),
    /// A message could not be parsed or processed
    ErrorCreated(ErrMsg),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::OrderedProcess(_) => EventKind::OrderedProcess,
            Event::ErrorCreated(_) => EventKind::ErrorCreated,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// JSON encoding of the payload alone, as published on the broker
    pub fn payload_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Event::OrderedProcess(order) => serde_json::to_vec(order),
            Event::ErrorCreated(err) => serde_json::to_vec(err),
        }
    }
}
