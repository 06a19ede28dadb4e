//! Broker-forwarding event handler.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

use super::dispatcher::EventHandler;
use super::types::Event;
use crate::clients::Notifier;
use crate::logging::log_error;

/// Serializes the event payload and forwards it to a [`Notifier`] under the
/// dispatch routing key. Failures are logged here and go no further.
pub struct NotifyingHandler {
    name: String,
    notifier: Arc<dyn Notifier>,
}

impl NotifyingHandler {
    pub fn new(name: impl Into<String>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            name: name.into(),
            notifier,
        }
    }
}

#[async_trait]
impl EventHandler for NotifyingHandler {
    async fn handle(&self, event: &Event, routing_key: &str) {
        let body = match event.payload_bytes() {
            Ok(body) => body,
            Err(e) => {
                log_error(&self.name, "serialize_payload", &e.to_string(), Some(event.name()));
                return;
            }
        };

        match self.notifier.notify(body, routing_key).await {
            Ok(()) => debug!(
                handler = %self.name,
                event = %event.name(),
                routing_key = %routing_key,
                "Forwarded event to notifier"
            ),
            Err(e) => error!(
                handler = %self.name,
                event = %event.name(),
                routing_key = %routing_key,
                error = %e,
                "Failed to notify event"
            ),
        }
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}
