//! Domain model (ids, task definitions, assignments, resolutions, states, errors).

pub mod assignment;
pub mod errors;
pub mod ids;
pub mod resolution;
pub mod state;
pub mod task;

pub use self::assignment::Assignment;
pub use self::errors::{
    ConfigurationError, EngineError, MembershipError, RegistryError, SchedulerError, StoreError,
};
pub use self::ids::{NodeId, TaskName};
pub use self::resolution::Resolution;
pub use self::state::LocalTaskState;
pub use self::task::{TaskActivation, TaskDefinition, TriggerDefinition};
