//! TaskRegistry port - durable source of truth for which tasks exist.
//!
//! Read every tick. A task missing from `list_task_names` is stopped locally
//! and its assignment row is eventually pruned by the cleaner.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::domain::{RegistryError, TaskDefinition, TaskName, TriggerDefinition};

/// TaskRegistry stores task definitions independently of where they run.
#[async_trait]
pub trait TaskRegistry: Send + Sync {
    /// Names of every registered task, active or not.
    async fn list_task_names(&self) -> Result<BTreeSet<TaskName>, RegistryError>;

    /// Full definition of `name`, or `UnknownTask` if it was removed meanwhile.
    async fn get_task(&self, name: &TaskName) -> Result<TaskDefinition, RegistryError>;

    /// Trigger handed to the engine on start.
    async fn trigger_definition(
        &self,
        name: &TaskName,
    ) -> Result<TriggerDefinition, RegistryError> {
        Ok(self.get_task(name).await?.trigger)
    }
}
