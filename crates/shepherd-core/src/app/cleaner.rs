//! AssignmentCleaner - prunes assignments that can no longer be honoured.

use std::collections::BTreeSet;

use crate::cluster::ClusterSnapshot;
use crate::domain::{Assignment, StoreError, TaskName};
use crate::ports::AssignmentStore;

/// What one cleaning pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Rows whose node is not in the live set.
    pub stale: Vec<Assignment>,

    /// Rows for tasks the registry no longer knows.
    pub orphaned: Vec<TaskName>,

    /// Rows that should have been removed but the store refused.
    pub failed: usize,

    /// The pass was skipped because the live set was empty.
    pub skipped: bool,
}

impl CleanReport {
    /// Rows actually removed by the pass.
    pub fn removed(&self) -> usize {
        self.stale.len() + self.orphaned.len()
    }
}

/// Removes assignment rows pointing at departed nodes (and, when a task list
/// is supplied, rows for tasks that no longer exist).
///
/// Runs inside the scheduler's tick, not on its own thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentCleaner;

impl AssignmentCleaner {
    pub fn new() -> Self {
        Self
    }

    /// One pass over the store.
    ///
    /// With `known_tasks` set, rows of unregistered tasks are removed too;
    /// `None` prunes only departed nodes. A single failed removal does not
    /// abort the pass, it is counted in `failed`.
    ///
    /// # Errors
    /// The store could not list its rows. Nothing was removed.
    pub async fn clean(
        &self,
        store: &dyn AssignmentStore,
        cluster: &ClusterSnapshot,
        known_tasks: Option<&BTreeSet<TaskName>>,
    ) -> Result<CleanReport, StoreError> {
        let mut report = CleanReport::default();

        // An empty live set means membership is unknown, not that every node left.
        if cluster.is_empty() {
            tracing::debug!("live node set is empty, skipping assignment cleanup");
            report.skipped = true;
            return Ok(report);
        }

        for row in store.all_assignments().await? {
            let orphaned = known_tasks.is_some_and(|tasks| !tasks.contains(&row.task_name));
            let stale = !cluster.is_live(&row.node_id);
            if !orphaned && !stale {
                continue;
            }

            if let Err(e) = store.remove(&row.task_name).await {
                tracing::error!(task = %row.task_name, error = %e, "failed to remove assignment");
                report.failed += 1;
                continue;
            }

            if orphaned {
                tracing::info!(task = %row.task_name, "removed assignment of unregistered task");
                report.orphaned.push(row.task_name);
            } else {
                tracing::info!(
                    task = %row.task_name,
                    node = %row.node_id,
                    "removed assignment of departed node"
                );
                report.stale.push(row);
            }
        }
        Ok(report)
    }
}
