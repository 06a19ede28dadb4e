//! # Orchestration
//!
//! The pre-processing state machine that sits behind each listener.

pub mod preprocessing;
pub mod state;

pub use preprocessing::{PreProcessingOrchestrator, PreProcessingStats};
pub use state::ProcessingState;
