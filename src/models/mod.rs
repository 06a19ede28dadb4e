//! # Models
//!
//! The staging entity and the DTOs the pipeline emits.

pub mod event_order;
pub mod outbound;

pub use event_order::EventOrder;
pub use outbound::{ErrMsg, ProcessOrder};
