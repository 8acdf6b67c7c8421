//! Task definitions as held by the registry.
//!
//! A definition carries what the scheduler needs to place a task (its name,
//! policy and activation) plus an opaque trigger for the local engine.

use serde::{Deserialize, Serialize};

use super::TaskName;

/// Trigger definition of a task (cron expression, interval, ...).
///
/// The scheduler never looks inside; it is handed to the local task engine as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerDefinition(serde_json::Value);

impl TriggerDefinition {
    /// Wrap an arbitrary engine-specific trigger.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Convenience constructor for the common "cron string" case.
    pub fn cron(expr: impl Into<String>) -> Self {
        Self(serde_json::json!({ "cron": expr.into() }))
    }

    /// Raw trigger value, as passed to the engine.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Whether a task should run anywhere at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskActivation {
    /// Eligible for placement.
    #[default]
    Active,
    /// Paused by an operator. Never resolved, stopped wherever it runs.
    Deactivated,
}

/// A task as known to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub name: TaskName,
    pub trigger: TriggerDefinition,

    /// Name of the resolver that places this task. `None` means the default resolver.
    #[serde(default)]
    pub policy: Option<String>,

    #[serde(default)]
    pub activation: TaskActivation,
}

impl TaskDefinition {
    /// Active definition placed by the default resolver.
    pub fn new(name: impl Into<TaskName>, trigger: TriggerDefinition) -> Self {
        Self {
            name: name.into(),
            trigger,
            policy: None,
            activation: TaskActivation::Active,
        }
    }

    /// Place this task with the resolver registered under `policy`.
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    /// Mark the task paused. Schedulers stop it and never resolve it.
    pub fn deactivated(mut self) -> Self {
        self.activation = TaskActivation::Deactivated;
        self
    }

    pub fn is_active(&self) -> bool {
        self.activation == TaskActivation::Active
    }
}
