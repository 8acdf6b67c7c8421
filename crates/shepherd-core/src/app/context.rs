//! SchedulerContext - everything one scheduler instance talks to.
//!
//! Constructed explicitly and handed to the scheduler, so several independent
//! schedulers (e.g. one per simulated node in a test) can coexist in a process.

use std::sync::Arc;

use crate::cluster::ClusterView;
use crate::ports::{AssignmentStore, Clock, LocalTaskEngine, TaskRegistry};
use crate::resolver::ResolverRegistry;

/// Ports and policies of one scheduler, usually assembled by `SchedulerBuilder`.
///
/// Cloning is cheap: every field is a shared handle.
#[derive(Clone)]
pub struct SchedulerContext {
    /// Live set, local identity and leadership.
    pub cluster: ClusterView,

    /// Assignment rows shared by every node of the cluster.
    pub store: Arc<dyn AssignmentStore>,

    /// Source of task names, triggers, activation and policy selectors.
    pub registry: Arc<dyn TaskRegistry>,

    /// Starts and stops tasks on this node only.
    pub engine: Arc<dyn LocalTaskEngine>,

    /// Default placement policy plus the named ones tasks may select.
    pub resolvers: ResolverRegistry,

    /// Stamps `resolved_at` on assignment rows.
    pub clock: Arc<dyn Clock>,
}
