//! Broker delivery seam.
//!
//! The physical broker transport lives outside this crate; a consumer only needs
//! something that yields deliveries for its queue binding.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// One message handed over by the broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub body: Vec<u8>,
    pub routing_key: String,
}

impl Delivery {
    pub fn new(body: impl Into<Vec<u8>>, routing_key: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            routing_key: routing_key.into(),
        }
    }
}

/// Source of broker deliveries for one queue binding.
///
/// `next_delivery` must be cancel-safe: the consumer races it against its stop
/// signal and drops the future when stopping. `None` means the source is closed.
#[async_trait]
pub trait DeliverySource: Send + 'static {
    async fn next_delivery(&mut self) -> Option<Delivery>;
}

/// In-process delivery source backed by a bounded tokio channel
#[derive(Debug)]
pub struct ChannelDeliverySource {
    receiver: mpsc::Receiver<Delivery>,
}

impl ChannelDeliverySource {
    /// Returns the publishing half together with the source
    pub fn new(capacity: usize) -> (mpsc::Sender<Delivery>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (sender, Self { receiver })
    }
}

#[async_trait]
impl DeliverySource for ChannelDeliverySource {
    async fn next_delivery(&mut self) -> Option<Delivery> {
        self.receiver.recv().await
    }
}
