//! # Event Dispatcher
//!
//! Registry of handlers keyed by [`EventKind`] with concurrent, wait-for-all fan-out.
//!
//! ## Semantics
//!
//! - Each handler for an event runs in its own tokio task.
//! - [`EventDispatcher::dispatch`] returns only after every task has finished, so the
//!   caller observes fan-out as a single synchronous step.
//! - Handlers own their failures: they log or notify and never fail the dispatch.
//!   The only error a dispatch reports is a handler task that panicked.
//! - There is no per-handler timeout; throughput is bounded by the slowest handler.
//!
//! The handler map sits behind a lock, so registrations may race with dispatches.
//! A dispatch works from a snapshot taken at its start.

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error};

use super::types::{Event, EventKind};
use crate::logging::log_dispatch_operation;

/// Capability invoked for every dispatched event of the kinds it is registered for
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Event, routing_key: &str);

    /// Name used in logs and registration errors
    fn handler_name(&self) -> &str {
        "unnamed_handler"
    }
}

pub type SharedEventHandler = Arc<dyn EventHandler>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Handler '{handler}' is already registered for event '{event}'")]
    AlreadyRegistered { event: String, handler: String },

    #[error("{panicked} handler(s) panicked while handling event '{event}'")]
    HandlerPanicked { event: String, panicked: usize },
}

/// Handlers are compared by allocation, not by value
fn same_handler(a: &SharedEventHandler, b: &SharedEventHandler) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

#[derive(Debug, Default)]
pub struct DispatcherStats {
    pub events_dispatched: AtomicU64,
    pub handler_invocations: AtomicU64,
    pub handler_panics: AtomicU64,
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: RwLock<HashMap<EventKind, Vec<SharedEventHandler>>>,
    stats: DispatcherStats,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the handlers of `kind`
    pub fn register(&self, kind: EventKind, handler: SharedEventHandler) -> Result<(), DispatchError> {
        let mut handlers = self.handlers.write();
        let registered = handlers.entry(kind).or_default();

        if registered.iter().any(|h| same_handler(h, &handler)) {
            return Err(DispatchError::AlreadyRegistered {
                event: kind.name().to_string(),
                handler: handler.handler_name().to_string(),
            });
        }

        debug!(
            event = %kind,
            handler = %handler.handler_name(),
            "Registered event handler"
        );
        registered.push(handler);
        Ok(())
    }

    pub fn has(&self, kind: EventKind, handler: &SharedEventHandler) -> bool {
        self.handlers
            .read()
            .get(&kind)
            .is_some_and(|registered| registered.iter().any(|h| same_handler(h, handler)))
    }

    /// Remove `handler` from `kind`; a handler that is not registered is ignored
    pub fn remove(&self, kind: EventKind, handler: &SharedEventHandler) {
        let mut handlers = self.handlers.write();
        if let Some(registered) = handlers.get_mut(&kind) {
            registered.retain(|h| !same_handler(h, handler));
            if registered.is_empty() {
                handlers.remove(&kind);
            }
        }
    }

    pub fn clear(&self) {
        self.handlers.write().clear();
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.read().get(&kind).map_or(0, Vec::len)
    }

    pub fn stats(&self) -> &DispatcherStats {
        &self.stats
    }

    /// Fan `event` out to every handler of its kind and wait for all of them
    pub async fn dispatch(&self, event: Event, routing_key: &str) -> Result<(), DispatchError> {
        let kind = event.kind();
        let handlers = self
            .handlers
            .read()
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            debug!(event = %kind, routing_key = %routing_key, "No handlers registered for event");
            return Ok(());
        }

        let started = Instant::now();
        let handler_count = handlers.len();
        let event = Arc::new(event);
        let routing_key: Arc<str> = Arc::from(routing_key);

        let tasks: Vec<_> = handlers
            .into_iter()
            .map(|handler| {
                let event = event.clone();
                let routing_key = routing_key.clone();
                tokio::spawn(async move { handler.handle(&event, &routing_key).await })
            })
            .collect();

        let panicked = join_all(tasks)
            .await
            .into_iter()
            .filter_map(Result::err)
            .inspect(|join_error| {
                error!(event = %kind, error = %join_error, "Event handler task failed");
            })
            .count();

        self.stats.events_dispatched.fetch_add(1, Ordering::Relaxed);
        self.stats
            .handler_invocations
            .fetch_add(handler_count as u64, Ordering::Relaxed);

        log_dispatch_operation(
            kind.name(),
            &routing_key,
            handler_count,
            started.elapsed().as_millis() as u64,
            if panicked == 0 { "completed" } else { "handler_panicked" },
        );

        if panicked > 0 {
            self.stats
                .handler_panics
                .fetch_add(panicked as u64, Ordering::Relaxed);
            return Err(DispatchError::HandlerPanicked {
                event: kind.name().to_string(),
                panicked,
            });
        }

        Ok(())
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.read();
        f.debug_struct("EventDispatcher")
            .field("event_kinds", &handlers.len())
            .field("handler_count", &handlers.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
