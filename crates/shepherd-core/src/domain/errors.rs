//! Errors - error types, one enum per concern.

use thiserror::Error;

use super::{NodeId, TaskName};

/// Invalid or unsupported configuration. Fatal where it is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("required property '{0}' is missing")]
    MissingProperty(String),

    #[error("property '{key}' has invalid value '{value}': {reason}")]
    InvalidProperty {
        key: String,
        value: String,
        reason: String,
    },

    #[error("{0} does not accept configuration properties")]
    Unsupported(&'static str),

    #[error("unknown resolver kind '{0}'")]
    UnknownResolver(String),

    #[error("invalid scheduler config: {0}")]
    InvalidScheduler(String),
}

/// Failure of the local task engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("failed to start task {task}: {reason}")]
    StartFailed { task: TaskName, reason: String },

    #[error("failed to stop task {task}: {reason}")]
    StopFailed { task: TaskName, reason: String },
}

/// Failure of the shared assignment store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("assignment store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the task registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("task {0} is not registered")]
    UnknownTask(TaskName),

    #[error("task registry unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the cluster membership service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    #[error("membership service unavailable: {0}")]
    Unavailable(String),

    #[error("node {0} is not a member of the cluster")]
    NotAMember(NodeId),
}

/// Errors surfaced by the scheduler's own lifecycle API.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("schedule manager is already running")]
    AlreadyRunning,

    #[error("schedule manager is not running")]
    NotRunning,

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
