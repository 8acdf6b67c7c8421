//! shepherd-core
//!
//! Cluster-aware coordination of periodic tasks: every named task runs on
//! exactly one node of the cluster, and moves when membership changes.
//!
//! # Modules
//! - **domain**: ids, task definitions, assignments, resolutions, errors
//! - **ports**: collaborator interfaces (membership, registry, engine, store, clock)
//! - **cluster**: read-only view of cluster membership
//! - **resolver**: placement policies (round-robin, active/passive, pinned node set)
//! - **app**: scheduler, cleaner, schedule manager, builder
//! - **impls**: in-memory port implementations for development and tests
//!
//! # Guarantees
//! - A task runs on at most one node once every node has ticked after the
//!   last membership change; in between, two nodes may briefly overlap.
//! - Placement is decided by the cluster leader alone and published through
//!   the assignment store. Other nodes only follow it.
//! - Nothing in a tick is fatal. Failed work is retried on the next tick.
//!
//! # Wiring
//! ```ignore
//! let scheduler = SchedulerBuilder::new()
//!     .membership(membership)
//!     .store(store)
//!     .registry(registry)
//!     .engine(engine)
//!     .config(SchedulerConfig::default())
//!     .build()?;
//! let mut manager = ScheduleManager::new(scheduler);
//! manager.start(initial_delay, period).await?;
//! ```

pub mod app;
pub mod cluster;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod resolver;

pub use app::{CoordinatedScheduler, ScheduleManager, SchedulerBuilder, SchedulerConfig};
pub use cluster::{ClusterSnapshot, ClusterView};
pub use resolver::{ResolverKind, TaskLocationResolver};
