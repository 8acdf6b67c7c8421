//! Assignment - the shared record of which node owns a task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NodeId, TaskName};

/// One row of the assignment store.
///
/// At most one row exists per task name; writers overwrite (last write wins).
/// `node_id` was live when it was chosen but may have left the cluster since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub task_name: TaskName,
    pub node_id: NodeId,
    pub resolved_at: DateTime<Utc>,
}

impl Assignment {
    /// Row placing `task_name` on `node_id`, decided at `resolved_at`.
    pub fn new(task_name: TaskName, node_id: NodeId, resolved_at: DateTime<Utc>) -> Self {
        Self {
            task_name,
            node_id,
            resolved_at,
        }
    }

    /// True when `node` is the owner recorded in this row.
    pub fn is_owned_by(&self, node: &NodeId) -> bool {
        &self.node_id == node
    }
}
