//! # Listener Registry
//!
//! Tag-keyed registry of (consumer, processor) pairs and their lifecycle.
//!
//! Starting a listener spawns one task that in turn spawns the consumer's
//! `consume()` and then runs the processor against the consumer's message channel:
//! ingestion and processing are two concurrently scheduled tasks joined only by
//! the channel.
//!
//! The registry lock guards tag membership only; consumers and processors manage
//! their own state.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use super::consumer::Consumer;
use super::errors::{ListenerError, ListenerResult};
use crate::logging::log_listener_operation;

/// Processing side of a listener
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    /// Work through `channel` until it closes
    async fn process_message_channel(&self, channel: mpsc::Receiver<Vec<u8>>, listener_tag: String);
}

#[derive(Clone)]
pub struct Listener {
    pub consumer: Arc<dyn Consumer>,
    pub processor: Arc<dyn MessageProcessor>,
}

impl Listener {
    pub fn new(consumer: Arc<dyn Consumer>, processor: Arc<dyn MessageProcessor>) -> Self {
        Self {
            consumer,
            processor,
        }
    }

    pub fn tag(&self) -> &str {
        self.consumer.listener_tag()
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener").field("tag", &self.tag()).finish()
    }
}

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<String, Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener under its consumer's tag
    pub fn add_listener(
        &self,
        consumer: Arc<dyn Consumer>,
        processor: Arc<dyn MessageProcessor>,
    ) -> ListenerResult<()> {
        let listener = Listener::new(consumer, processor);
        let tag = listener.tag().to_string();

        let mut listeners = self.listeners.lock();
        if listeners.contains_key(&tag) {
            return Err(ListenerError::AlreadyExists { tag });
        }
        listeners.insert(tag.clone(), listener);
        drop(listeners);

        log_listener_operation("add_listener", &tag, "registered", None);
        Ok(())
    }

    /// Stop the listener's consumer and drop it from the registry
    pub fn remove_listener(&self, tag: &str) -> ListenerResult<Listener> {
        let listener = self
            .listeners
            .lock()
            .remove(tag)
            .ok_or_else(|| ListenerError::NotFound {
                tag: tag.to_string(),
            })?;

        listener.consumer.stop();
        log_listener_operation("remove_listener", tag, "removed", None);
        Ok(listener)
    }

    pub fn get_listener(&self, tag: &str) -> ListenerResult<Listener> {
        self.listeners
            .lock()
            .get(tag)
            .cloned()
            .ok_or_else(|| ListenerError::NotFound {
                tag: tag.to_string(),
            })
    }

    pub fn get_listeners(&self) -> Vec<Listener> {
        self.listeners.lock().values().cloned().collect()
    }

    pub fn listener_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.listeners.lock().keys().cloned().collect();
        tags.sort();
        tags
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Spawn ingestion and processing for `tag`.
    ///
    /// The returned handle completes once the processor has drained the channel,
    /// which happens after the consumer stops. A listener can be started once.
    pub fn start_listener(&self, tag: &str) -> ListenerResult<JoinHandle<()>> {
        let listener = self.get_listener(tag)?;
        let channel = listener.consumer.take_message_channel().ok_or_else(|| {
            ListenerError::ChannelUnavailable {
                tag: tag.to_string(),
            }
        })?;
        let tag = tag.to_string();

        log_listener_operation("start_listener", &tag, "starting", None);

        Ok(tokio::spawn(async move {
            let consumer = listener.consumer.clone();
            let consume_tag = tag.clone();
            let ingestion = tokio::spawn(async move {
                if let Err(e) = consumer.consume().await {
                    warn!(listener_tag = %consume_tag, error = %e, "Consumer exited with error");
                }
            });

            listener
                .processor
                .process_message_channel(channel, tag.clone())
                .await;

            if let Err(e) = ingestion.await {
                error!(listener_tag = %tag, error = %e, "Consumer task failed");
            }
            log_listener_operation("start_listener", &tag, "finished", None);
        }))
    }

    pub fn stop_listener(&self, tag: &str) -> ListenerResult<()> {
        let listener = self.get_listener(tag)?;
        listener.consumer.stop();
        Ok(())
    }

    pub fn stop_all(&self) {
        for listener in self.get_listeners() {
            listener.consumer.stop();
        }
    }
}
