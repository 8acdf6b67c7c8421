//! Ports - interfaces to the collaborators this crate does not implement.
//!
//! Every trait here is a seam: production wires real services in, tests and
//! the demo binary use the in-memory versions from `impls`.

pub mod assignment_store;
pub mod clock;
pub mod cluster;
pub mod task_engine;
pub mod task_registry;

pub use self::assignment_store::AssignmentStore;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::cluster::{ClusterMembership, MembershipEvent};
pub use self::task_engine::LocalTaskEngine;
pub use self::task_registry::TaskRegistry;
