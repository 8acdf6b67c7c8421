//! AssignmentStore port - durable task -> node mapping shared by the cluster.
//!
//! This is the only state written by more than one node. No lock is taken:
//! concurrent `put`s for the same task resolve as last write wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Assignment, NodeId, StoreError, TaskName};

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Insert or overwrite the assignment for `task`.
    async fn put(
        &self,
        task: &TaskName,
        node: &NodeId,
        resolved_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Row for `task`, `None` if no node was ever chosen or it was pruned.
    async fn get(&self, task: &TaskName) -> Result<Option<Assignment>, StoreError>;

    /// Every row, in no particular order. Used by the cleaner.
    async fn all_assignments(&self) -> Result<Vec<Assignment>, StoreError>;

    /// Remove the assignment for `task`. Removing an absent row is not an error.
    async fn remove(&self, task: &TaskName) -> Result<(), StoreError>;
}
