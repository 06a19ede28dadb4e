//! # Event System
//!
//! Closed event union, the concurrent fan-out dispatcher and the broker-forwarding
//! handler.
//!
//! ```text
//! Orchestrator ── dispatch(Event, routing_key) ──► EventDispatcher
//!                                                   ├─► handler A (task)
//!                                                   ├─► handler B (task) ──► Notifier
//!                                                   └─► ... joined before returning
//! ```

pub mod dispatcher;
pub mod handlers;
pub mod types;

pub use dispatcher::{
    DispatchError, DispatcherStats, EventDispatcher, EventHandler, SharedEventHandler,
};
pub use handlers::NotifyingHandler;
pub use types::{Event, EventKind};
