//! InMemoryTaskRegistry - task definitions held in memory.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{RegistryError, TaskActivation, TaskDefinition, TaskName};
use crate::ports::TaskRegistry;

#[derive(Clone, Default)]
pub struct InMemoryTaskRegistry {
    tasks: Arc<RwLock<BTreeMap<TaskName, TaskDefinition>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryTaskRegistry {
    /// Empty registry, available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a definition.
    pub async fn add(&self, task: TaskDefinition) {
        self.tasks.write().await.insert(task.name.clone(), task);
    }

    /// Unregister a task, returning its definition.
    pub async fn remove(&self, name: &TaskName) -> Option<TaskDefinition> {
        self.tasks.write().await.remove(name)
    }

    /// Simulate the registry's backing store being unreachable.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RegistryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }

    /// Flip a task between active and deactivated. Returns false for unknown tasks.
    pub async fn set_activation(&self, name: &TaskName, activation: TaskActivation) -> bool {
        match self.tasks.write().await.get_mut(name) {
            Some(task) => {
                task.activation = activation;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl TaskRegistry for InMemoryTaskRegistry {
    async fn list_task_names(&self) -> Result<BTreeSet<TaskName>, RegistryError> {
        self.check()?;
        Ok(self.tasks.read().await.keys().cloned().collect())
    }

    async fn get_task(&self, name: &TaskName) -> Result<TaskDefinition, RegistryError> {
        self.check()?;
        self.tasks
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTask(name.clone()))
    }
}
