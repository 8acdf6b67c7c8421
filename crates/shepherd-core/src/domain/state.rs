//! Local view of a task's execution state.

use serde::{Deserialize, Serialize};

/// Per-task state as seen from this node.
///
/// Transitions (one per tick):
/// - Unassigned -> Running  (resolved to this node, local start succeeded)
/// - Unassigned -> Idle     (resolved to another node)
/// - Running -> Idle        (placement moved away, local stop succeeded)
/// - Idle -> Running        (placement moved here)
/// - any -> unchanged       (unresolved, engine or store failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalTaskState {
    /// No placement decision has reached this node yet.
    Unassigned,

    /// Assigned to this node and executing in the local task engine.
    Running,

    /// Assigned to another node; not executing here.
    Idle,
}

impl LocalTaskState {
    /// True only for `Running`.
    pub fn is_running(self) -> bool {
        matches!(self, LocalTaskState::Running)
    }
}
