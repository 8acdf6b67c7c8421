//! App - the scheduling control plane built on the ports.
//!
//! # Components
//! - **SchedulerBuilder**: wiring and fail-fast validation
//! - **CoordinatedScheduler**: per-tick reconciliation of placement and local execution
//! - **AssignmentCleaner**: prunes assignments of departed nodes and removed tasks
//! - **ScheduleManager**: fixed-delay driver for the scheduler

pub mod builder;
pub mod cleaner;
pub mod config;
pub mod context;
pub mod manager;
pub mod scheduler;
pub mod status;

pub use self::builder::{BuildError, SchedulerBuilder};
pub use self::cleaner::{AssignmentCleaner, CleanReport};
pub use self::config::{ResolverConfig, SchedulerConfig};
pub use self::context::SchedulerContext;
pub use self::manager::ScheduleManager;
pub use self::scheduler::CoordinatedScheduler;
pub use self::status::{SchedulerStatus, StateCounts, TickReport};
