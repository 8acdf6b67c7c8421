//! InMemoryTaskEngine - records which tasks run on a node.
//!
//! Does not execute anything. Failures can be injected per task to exercise
//! the scheduler's retry behaviour.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{EngineError, TaskName, TriggerDefinition};
use crate::ports::LocalTaskEngine;

#[derive(Default)]
struct EngineState {
    running: HashMap<TaskName, TriggerDefinition>,
    failing: HashSet<TaskName>,
    starts: usize,
    stops: usize,
}

#[derive(Clone, Default)]
pub struct InMemoryTaskEngine {
    state: Arc<Mutex<EngineState>>,
}

impl InMemoryTaskEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make start/stop of `task` fail until `heal` is called.
    pub async fn fail_task(&self, task: &TaskName) {
        self.state.lock().await.failing.insert(task.clone());
    }

    pub async fn heal(&self, task: &TaskName) {
        self.state.lock().await.failing.remove(task);
    }

    pub async fn running_tasks(&self) -> Vec<TaskName> {
        let mut tasks: Vec<TaskName> = self.state.lock().await.running.keys().cloned().collect();
        tasks.sort();
        tasks
    }

    /// Total successful (start, stop) calls.
    pub async fn call_counts(&self) -> (usize, usize) {
        let state = self.state.lock().await;
        (state.starts, state.stops)
    }
}

#[async_trait]
impl LocalTaskEngine for InMemoryTaskEngine {
    async fn start(
        &self,
        task: &TaskName,
        trigger: &TriggerDefinition,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        if state.failing.contains(task) {
            return Err(EngineError::StartFailed {
                task: task.clone(),
                reason: "injected failure".to_string(),
            });
        }
        state.running.insert(task.clone(), trigger.clone());
        state.starts += 1;
        Ok(())
    }

    async fn stop(&self, task: &TaskName) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        if state.failing.contains(task) {
            return Err(EngineError::StopFailed {
                task: task.clone(),
                reason: "injected failure".to_string(),
            });
        }
        if state.running.remove(task).is_some() {
            state.stops += 1;
        }
        Ok(())
    }

    async fn is_running(&self, task: &TaskName) -> bool {
        self.state.lock().await.running.contains_key(task)
    }
}
