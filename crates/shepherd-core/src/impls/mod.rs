//! Impls - in-memory implementations of the ports.
//!
//! Used by tests and the demo binary. Production deployments wire their own
//! membership service, task registry, engine and durable store.

pub mod inmem_cluster;
pub mod inmem_engine;
pub mod inmem_registry;
pub mod inmem_store;

pub use self::inmem_cluster::StaticMembership;
pub use self::inmem_engine::InMemoryTaskEngine;
pub use self::inmem_registry::InMemoryTaskRegistry;
pub use self::inmem_store::InMemoryAssignmentStore;
