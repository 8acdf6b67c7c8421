//! ClusterMembership port - the cluster membership service.
//!
//! Leader election and failure detection live behind this trait; the scheduler
//! only reads the live set, asks whether it currently leads, and reacts to
//! join/leave notifications.
//!
//! # Roles
//! - **leader**: the one node that prunes the assignment store and decides
//!   placement for unassigned tasks. Placement policies with memory
//!   (active/passive) therefore see every decision.
//! - **members**: every node, the leader included, starts or stops tasks
//!   locally according to the assignments it finds in the store.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{MembershipError, NodeId};

/// A change in cluster membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipEvent {
    Joined(NodeId),
    Left(NodeId),
}

/// Source of the live node set.
///
/// `live_node_ids` returns members in a stable order; resolvers index into it,
/// so every node should observe the same order for the same membership.
/// An empty list is valid and means "nothing is known yet".
#[async_trait]
pub trait ClusterMembership: Send + Sync {
    async fn live_node_ids(&self) -> Result<Vec<NodeId>, MembershipError>;

    /// Whether this node is currently the cluster leader.
    ///
    /// At most one live node should answer `true` at a time. A node that has
    /// been expelled may answer `NotAMember`.
    async fn is_leader(&self) -> Result<bool, MembershipError>;

    /// Identity of this node; stable for the lifetime of the process.
    fn local_node_id(&self) -> NodeId;

    /// Subscribe to membership changes.
    fn subscribe(&self) -> broadcast::Receiver<MembershipEvent>;
}
