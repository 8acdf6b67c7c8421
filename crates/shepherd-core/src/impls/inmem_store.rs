//! InMemoryAssignmentStore - assignment store for development and tests.
//!
//! Clone the handle (or share the `Arc`) to give several simulated nodes the
//! same store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{Assignment, NodeId, StoreError, TaskName};
use crate::ports::AssignmentStore;

#[derive(Clone, Default)]
pub struct InMemoryAssignmentStore {
    rows: Arc<Mutex<HashMap<TaskName, Assignment>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `StoreError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of rows, regardless of availability.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn put(
        &self,
        task: &TaskName,
        node: &NodeId,
        resolved_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.check()?;
        let row = Assignment::new(task.clone(), node.clone(), resolved_at);
        self.rows.lock().await.insert(task.clone(), row);
        Ok(())
    }

    async fn get(&self, task: &TaskName) -> Result<Option<Assignment>, StoreError> {
        self.check()?;
        Ok(self.rows.lock().await.get(task).cloned())
    }

    async fn all_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        self.check()?;
        let mut rows: Vec<Assignment> = self.rows.lock().await.values().cloned().collect();
        rows.sort_by(|a, b| a.task_name.cmp(&b.task_name));
        Ok(rows)
    }

    async fn remove(&self, task: &TaskName) -> Result<(), StoreError> {
        self.check()?;
        self.rows.lock().await.remove(task);
        Ok(())
    }
}
