//! Status - what this node believes about its tasks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{LocalTaskState, NodeId, TaskName};

/// Number of local tasks in each state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub running: usize,
    pub idle: usize,
    pub unassigned: usize,
}

impl StateCounts {
    /// Tally an iterator of states.
    pub fn from_states<'a>(states: impl IntoIterator<Item = &'a LocalTaskState>) -> Self {
        let mut counts = StateCounts::default();
        for state in states {
            match state {
                LocalTaskState::Running => counts.running += 1,
                LocalTaskState::Idle => counts.idle += 1,
                LocalTaskState::Unassigned => counts.unassigned += 1,
            }
        }
        counts
    }
}

/// Snapshot of a scheduler, suitable for logging or serving as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub node: NodeId,
    /// Ticks completed so far.
    pub ticks: u64,
    /// Cleaner passes that completed.
    pub cleanups: u64,
    pub tasks: BTreeMap<TaskName, LocalTaskState>,
    pub counts: StateCounts,
}

impl SchedulerStatus {
    /// Names of tasks running on this node, sorted.
    pub fn running_tasks(&self) -> Vec<&TaskName> {
        self.tasks
            .iter()
            .filter(|(_, state)| state.is_running())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Per-tick summary returned by `CoordinatedScheduler::tick`.
///
/// Failures are counted here instead of being returned as errors: a tick
/// always completes, and whatever failed is retried on the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Zero-based sequence number of the tick.
    pub tick: u64,

    /// This node led the cluster during the tick (and so owned cleanup and placement).
    pub leader: bool,

    /// A cleanup pass ran to completion or partially (see `cleaned_rows`).
    pub cleaned: bool,
    pub cleaned_rows: usize,

    /// New assignments written by this node.
    pub resolved: usize,

    /// Tasks left without a live assignment this tick.
    pub unresolved: usize,

    pub started: usize,
    pub stopped: usize,
    pub engine_failures: usize,
    pub store_failures: usize,
    pub registry_failed: bool,
}

impl TickReport {
    /// Whether any collaborator failed during the tick.
    pub fn had_failures(&self) -> bool {
        self.engine_failures > 0 || self.store_failures > 0 || self.registry_failed
    }
}
