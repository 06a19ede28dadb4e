//! # Broker Consumer
//!
//! Turns broker deliveries into a bounded byte-message channel per listener. The
//! main loop races the next delivery against the stop signal, and forwarding into
//! the channel is raced against the same signal, so a stopped consumer never stays
//! parked on a full channel. When the loop ends the sender is dropped, which lets
//! the processing worker drain what is buffered and finish.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::delivery::DeliverySource;
use super::errors::{ListenerError, ListenerResult};
use crate::config::ListenerConfig;
use crate::logging::log_listener_operation;

/// Ingestion side of a listener
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Run until stopped or until the delivery source closes. A consumer runs once.
    async fn consume(&self) -> ListenerResult<()>;

    /// Unique `{name}:{queue}:{routing_key}` identifier
    fn listener_tag(&self) -> &str;

    /// The receive half of the message channel; handed out once
    fn take_message_channel(&self) -> Option<mpsc::Receiver<Vec<u8>>>;

    /// Signal the main loop to exit
    fn stop(&self);
}

#[derive(Debug, Default)]
pub struct ConsumerStats {
    pub deliveries_received: AtomicU64,
    pub messages_forwarded: AtomicU64,
}

pub struct BrokerConsumer<S: DeliverySource> {
    config: ListenerConfig,
    tag: String,
    source: tokio::sync::Mutex<S>,
    sender: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
    receiver: Mutex<Option<mpsc::Receiver<Vec<u8>>>>,
    shutdown: CancellationToken,
    stats: ConsumerStats,
}

impl<S: DeliverySource> BrokerConsumer<S> {
    pub fn new(config: ListenerConfig, source: S) -> Self {
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let tag = config.tag();

        Self {
            config,
            tag,
            source: tokio::sync::Mutex::new(source),
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            shutdown: CancellationToken::new(),
            stats: ConsumerStats::default(),
        }
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    pub fn stats(&self) -> &ConsumerStats {
        &self.stats
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl<S: DeliverySource> std::fmt::Debug for BrokerConsumer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConsumer")
            .field("tag", &self.tag)
            .field("stopped", &self.shutdown.is_cancelled())
            .field("stats", &self.stats)
            .finish()
    }
}

#[async_trait]
impl<S: DeliverySource> Consumer for BrokerConsumer<S> {
    async fn consume(&self) -> ListenerResult<()> {
        let sender = self
            .sender
            .lock()
            .take()
            .ok_or_else(|| ListenerError::AlreadyConsuming {
                tag: self.tag.clone(),
            })?;
        let mut source = self.source.lock().await;

        log_listener_operation("consume", &self.tag, "started", Some(&self.config.queue));

        let reason = loop {
            let delivery = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break "stopped",
                delivery = source.next_delivery() => match delivery {
                    Some(delivery) => delivery,
                    None => break "source_closed",
                },
            };
            self.stats.deliveries_received.fetch_add(1, Ordering::Relaxed);
            debug!(
                listener_tag = %self.tag,
                routing_key = %delivery.routing_key,
                bytes = delivery.body.len(),
                "Received delivery"
            );

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break "stopped",
                sent = sender.send(delivery.body) => match sent {
                    Ok(()) => {
                        self.stats.messages_forwarded.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(_) => {
                        warn!(listener_tag = %self.tag, "Message channel closed by processor");
                        break "processor_gone";
                    }
                },
            }
        };

        drop(sender);
        log_listener_operation("consume", &self.tag, reason, None);
        Ok(())
    }

    fn listener_tag(&self) -> &str {
        &self.tag
    }

    fn take_message_channel(&self) -> Option<mpsc::Receiver<Vec<u8>>> {
        self.receiver.lock().take()
    }

    fn stop(&self) {
        if !self.shutdown.is_cancelled() {
            self.shutdown.cancel();
            log_listener_operation("stop", &self.tag, "stop_requested", None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::delivery::{ChannelDeliverySource, Delivery};
    use std::sync::Arc;
    use std::time::Duration;

    fn consumer(capacity: usize) -> (mpsc::Sender<Delivery>, Arc<BrokerConsumer<ChannelDeliverySource>>) {
        let (publisher, source) = ChannelDeliverySource::new(8);
        let config = ListenerConfig::new("c", "q", "input.created.#").with_channel_capacity(capacity);
        (publisher, Arc::new(BrokerConsumer::new(config, source)))
    }

    #[tokio::test]
    async fn test_forwards_deliveries_in_order() {
        let (publisher, consumer) = consumer(8);
        let mut channel = consumer.take_message_channel().unwrap();
        assert!(consumer.take_message_channel().is_none());

        let running = tokio::spawn({
            let consumer = consumer.clone();
            async move { consumer.consume().await }
        });

        publisher.send(Delivery::new(b"a".to_vec(), "k")).await.unwrap();
        publisher.send(Delivery::new(b"b".to_vec(), "k")).await.unwrap();

        assert_eq!(channel.recv().await.unwrap(), b"a".to_vec());
        assert_eq!(channel.recv().await.unwrap(), b"b".to_vec());

        drop(publisher);
        running.await.unwrap().unwrap();
        // Sender dropped on exit, so the channel ends
        assert!(channel.recv().await.is_none());
        assert_eq!(consumer.stats().messages_forwarded.load(Ordering::Relaxed), 2);
        assert_eq!(consumer.listener_tag(), "c:q:input.created.#");
    }

    #[tokio::test]
    async fn test_stop_exits_idle_loop_within_bound() {
        let (_publisher, consumer) = consumer(8);
        let running = tokio::spawn({
            let consumer = consumer.clone();
            async move { consumer.consume().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        consumer.stop();

        let result = tokio::time::timeout(Duration::from_secs(1), running).await;
        assert!(result.is_ok(), "consumer did not stop in time");
        assert!(consumer.is_stopped());
    }

    #[tokio::test]
    async fn test_stop_unblocks_send_on_full_channel() {
        let (publisher, consumer) = consumer(1);
        // Nobody reads the message channel
        let _channel = consumer.take_message_channel().unwrap();
        let running = tokio::spawn({
            let consumer = consumer.clone();
            async move { consumer.consume().await }
        });

        for body in [b"1", b"2", b"3"] {
            publisher.send(Delivery::new(body.to_vec(), "k")).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        consumer.stop();

        let result = tokio::time::timeout(Duration::from_secs(1), running).await;
        assert!(result.is_ok(), "blocked send leaked the consumer task");
        assert_eq!(consumer.stats().messages_forwarded.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_second_consume_is_rejected() {
        let (_publisher, consumer) = consumer(8);
        consumer.stop();
        consumer.consume().await.unwrap();

        let err = consumer.consume().await.unwrap_err();
        assert!(matches!(err, ListenerError::AlreadyConsuming { .. }));
    }
}
