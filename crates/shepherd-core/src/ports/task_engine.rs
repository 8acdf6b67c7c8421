//! LocalTaskEngine port - executes tasks on this node.
//!
//! Typically a cron-style scheduler. Calls are expected to be quick and bounded
//! by the engine's own timeouts.

use async_trait::async_trait;

use crate::domain::{EngineError, TaskName, TriggerDefinition};

/// The scheduler calls `start` at most once per task until `stop` succeeds,
/// and keeps its own record of what it started.
#[async_trait]
pub trait LocalTaskEngine: Send + Sync {
    /// Begin executing `task` on this node according to `trigger`.
    async fn start(&self, task: &TaskName, trigger: &TriggerDefinition)
    -> Result<(), EngineError>;

    /// Stop executing `task` on this node.
    async fn stop(&self, task: &TaskName) -> Result<(), EngineError>;

    /// Whether the engine currently executes `task`.
    async fn is_running(&self, task: &TaskName) -> bool;
}
