//! Per-message pre-processing states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a message is in the pre-processing pipeline.
///
/// Success path: `Received → Parsed → Staged → Validated → DependenciesResolved →
/// Dispatched → Unstaged`. Errors end in `Failed` (an ErrorCreated event was
/// emitted); a schema rejection ends in `StatusUpdated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    Received,
    Parsed,
    Staged,
    Validated,
    DependenciesResolved,
    Dispatched,
    Unstaged,
    Failed,
    StatusUpdated,
}

impl ProcessingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingState::Received => "received",
            ProcessingState::Parsed => "parsed",
            ProcessingState::Staged => "staged",
            ProcessingState::Validated => "validated",
            ProcessingState::DependenciesResolved => "dependencies_resolved",
            ProcessingState::Dispatched => "dispatched",
            ProcessingState::Unstaged => "unstaged",
            ProcessingState::Failed => "failed",
            ProcessingState::StatusUpdated => "status_updated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessingState::Unstaged | ProcessingState::Failed | ProcessingState::StatusUpdated
        )
    }
}

impl fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
