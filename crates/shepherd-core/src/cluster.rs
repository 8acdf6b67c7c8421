//! ClusterView - read-only facade over the membership service.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::domain::NodeId;
use crate::ports::{ClusterMembership, MembershipEvent};

/// Membership as observed at one instant.
///
/// Resolvers work on a snapshot so that one tick sees a single, consistent
/// live set even if membership changes underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSnapshot {
    local: NodeId,
    live: Vec<NodeId>,
}

impl ClusterSnapshot {
    /// Live ids are sorted and deduplicated so every node indexes them alike.
    pub fn new(local: NodeId, mut live: Vec<NodeId>) -> Self {
        live.sort();
        live.dedup();
        Self { local, live }
    }

    pub fn local_node_id(&self) -> &NodeId {
        &self.local
    }

    pub fn live_node_ids(&self) -> &[NodeId] {
        &self.live
    }

    /// Whether `node` was live when the snapshot was taken.
    pub fn is_live(&self, node: &NodeId) -> bool {
        self.live.contains(node)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// Thin wrapper around a `ClusterMembership`.
#[derive(Clone)]
pub struct ClusterView {
    membership: Arc<dyn ClusterMembership>,
}

impl ClusterView {
    pub fn new(membership: Arc<dyn ClusterMembership>) -> Self {
        Self { membership }
    }

    pub fn local_node_id(&self) -> NodeId {
        self.membership.local_node_id()
    }

    /// Current live members. Failures of the membership service are reported as
    /// an empty set: callers treat that as "cannot resolve yet".
    pub async fn live_node_ids(&self) -> Vec<NodeId> {
        match self.membership.live_node_ids().await {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(error = %e, "membership lookup failed, treating cluster as empty");
                Vec::new()
            }
        }
    }

    /// Whether this node leads the cluster right now. Any membership failure,
    /// including this node no longer being a member, reads as "not leader".
    pub async fn is_leader(&self) -> bool {
        match self.membership.is_leader().await {
            Ok(leader) => leader,
            Err(e) => {
                tracing::warn!(error = %e, "leadership lookup failed, acting as follower");
                false
            }
        }
    }

    /// Live set and local identity captured together for one tick.
    pub async fn snapshot(&self) -> ClusterSnapshot {
        ClusterSnapshot::new(self.local_node_id(), self.live_node_ids().await)
    }

    /// Join/leave notifications from the membership service.
    pub fn subscribe(&self) -> broadcast::Receiver<MembershipEvent> {
        self.membership.subscribe()
    }
}
