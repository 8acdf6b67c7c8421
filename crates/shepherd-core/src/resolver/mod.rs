//! Task location resolvers - pluggable placement policies.
//!
//! A resolver maps a task name to the node that should run it, given a
//! membership snapshot. Implementations may keep internal counters; those are
//! atomics so a resolver can be shared behind an `Arc`.
//!
//! # Built-in policies
//! - `round_robin`: spread by call count, optionally waiting for a quorum.
//! - `active_passive`: one sticky node runs everything until it leaves.
//! - `pinned_node_set`: round-robin over an operator-approved subset.
//!
//! # Where resolution happens
//! Only the cluster leader calls `resolve`; other nodes read the result from
//! the assignment store. A resolver's internal state (counters, sticky node)
//! therefore lives on one node at a time and restarts from scratch when
//! leadership moves.

pub mod active_passive;
pub mod pinned;
pub mod properties;
pub mod registry;
pub mod round_robin;

pub use self::active_passive::ActivePassiveResolver;
pub use self::pinned::PinnedNodeSetResolver;
pub use self::properties::{ResolverProperties, TASK_NODES, TASK_SERVER_COUNT};
pub use self::registry::ResolverRegistry;
pub use self::round_robin::RoundRobinResolver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cluster::ClusterSnapshot;
use crate::domain::{ConfigurationError, Resolution, TaskName};

/// Placement policy.
///
/// `init` is called once before the resolver is shared; calling it again
/// reinitialises the resolver. `resolve` must tolerate being called every tick.
pub trait TaskLocationResolver: Send + Sync {
    /// Short policy name used in logs.
    fn kind(&self) -> &'static str;

    /// Validate and apply `properties`.
    fn init(&mut self, properties: &ResolverProperties) -> Result<(), ConfigurationError>;

    /// Pick a live node for `task`, or `Unresolved` to retry next tick.
    fn resolve(&self, cluster: &ClusterSnapshot, task: &TaskName) -> Resolution;
}

/// The closed set of built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    RoundRobin,
    ActivePassive,
    PinnedNodeSet,
}

impl ResolverKind {
    /// Name used in configuration files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ResolverKind::RoundRobin => "round_robin",
            ResolverKind::ActivePassive => "active_passive",
            ResolverKind::PinnedNodeSet => "pinned_node_set",
        }
    }

    /// Construct and initialise a resolver of this kind.
    pub fn build(
        self,
        properties: &ResolverProperties,
    ) -> Result<Box<dyn TaskLocationResolver>, ConfigurationError> {
        let mut resolver: Box<dyn TaskLocationResolver> = match self {
            ResolverKind::RoundRobin => Box::new(RoundRobinResolver::new()),
            ResolverKind::ActivePassive => Box::new(ActivePassiveResolver::new()),
            ResolverKind::PinnedNodeSet => Box::new(PinnedNodeSetResolver::new()),
        };
        resolver.init(properties)?;
        Ok(resolver)
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolverKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "round_robin" => Ok(ResolverKind::RoundRobin),
            "active_passive" => Ok(ResolverKind::ActivePassive),
            "pinned_node_set" => Ok(ResolverKind::PinnedNodeSet),
            other => Err(ConfigurationError::UnknownResolver(other.to_string())),
        }
    }
}
