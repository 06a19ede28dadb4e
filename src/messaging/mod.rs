//! # Messaging Module
//!
//! Broker-facing listener framework: consumers turn deliveries into a per-listener
//! byte channel, the registry pairs each consumer with a message processor, and the
//! server runs them all until shutdown.

pub mod consumer;
pub mod delivery;
pub mod errors;
pub mod message;
pub mod registry;
pub mod server;

pub use consumer::{BrokerConsumer, Consumer, ConsumerStats};
pub use delivery::{ChannelDeliverySource, Delivery, DeliverySource};
pub use errors::{ListenerError, ListenerResult};
pub use message::InputMessage;
pub use registry::{Listener, ListenerRegistry, MessageProcessor};
pub use server::Server;
