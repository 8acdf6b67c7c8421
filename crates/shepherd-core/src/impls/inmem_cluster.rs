//! StaticMembership - in-process membership service.
//!
//! Several `StaticMembership` handles can share one member list (one handle per
//! simulated node), which is how tests and the demo binary model a cluster.
//!
//! Leadership is deterministic: the live member with the smallest id leads.
//! When the leader leaves, the next smallest id takes over on its next query,
//! so failover in tests needs no election rounds.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{MembershipError, NodeId};
use crate::ports::{ClusterMembership, MembershipEvent};

const EVENT_CAPACITY: usize = 64;

struct Board {
    live: Mutex<BoardState>,
    events: broadcast::Sender<MembershipEvent>,
}

struct BoardState {
    members: BTreeSet<NodeId>,
    available: bool,
}

/// Membership backed by a shared in-memory member list.
#[derive(Clone)]
pub struct StaticMembership {
    local: NodeId,
    board: Arc<Board>,
}

impl StaticMembership {
    pub fn new<I, S>(local: impl Into<NodeId>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            local: local.into(),
            board: Arc::new(Board {
                live: Mutex::new(BoardState {
                    members: members.into_iter().map(Into::into).collect(),
                    available: true,
                }),
                events,
            }),
        }
    }

    /// Another node's handle onto the same member list.
    pub fn for_node(&self, local: impl Into<NodeId>) -> Self {
        Self {
            local: local.into(),
            board: Arc::clone(&self.board),
        }
    }

    pub fn join(&self, node: &NodeId) {
        let inserted = self.state().members.insert(node.clone());
        if inserted {
            // no subscribers is fine
            let _ = self.board.events.send(MembershipEvent::Joined(node.clone()));
        }
    }

    pub fn leave(&self, node: &NodeId) {
        let removed = self.state().members.remove(node);
        if removed {
            let _ = self.board.events.send(MembershipEvent::Left(node.clone()));
        }
    }

    /// Simulate the membership service being unreachable.
    pub fn set_available(&self, available: bool) {
        self.state().available = available;
    }

    fn state(&self) -> std::sync::MutexGuard<'_, BoardState> {
        self.board.live.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ClusterMembership for StaticMembership {
    async fn live_node_ids(&self) -> Result<Vec<NodeId>, MembershipError> {
        let state = self.state();
        if !state.available {
            return Err(MembershipError::Unavailable("simulated outage".to_string()));
        }
        Ok(state.members.iter().cloned().collect())
    }

    async fn is_leader(&self) -> Result<bool, MembershipError> {
        let state = self.state();
        if !state.available {
            return Err(MembershipError::Unavailable("simulated outage".to_string()));
        }
        if !state.members.contains(&self.local) {
            return Err(MembershipError::NotAMember(self.local.clone()));
        }
        Ok(state.members.first() == Some(&self.local))
    }

    fn local_node_id(&self) -> NodeId {
        self.local.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<MembershipEvent> {
        self.board.events.subscribe()
    }
}
