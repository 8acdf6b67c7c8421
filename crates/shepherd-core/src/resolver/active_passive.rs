//! ActivePassiveResolver - every task goes to one sticky node until it leaves.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::properties::ResolverProperties;
use super::TaskLocationResolver;
use crate::cluster::ClusterSnapshot;
use crate::domain::{ConfigurationError, NodeId, Resolution, TaskName};

/// Holds one cached node and keeps returning it while it is live.
///
/// When the cached node disappears a uniformly random survivor is picked once
/// and becomes the new sticky node.
#[derive(Debug)]
pub struct ActivePassiveResolver {
    sticky: Mutex<Option<NodeId>>,
    rng: Mutex<StdRng>,
}

impl ActivePassiveResolver {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic variant for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            sticky: Mutex::new(None),
            rng: Mutex::new(rng),
        }
    }

    /// Node currently chosen, if any resolution has happened.
    pub fn sticky_node(&self) -> Option<NodeId> {
        self.sticky.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for ActivePassiveResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskLocationResolver for ActivePassiveResolver {
    fn kind(&self) -> &'static str {
        "active_passive"
    }

    /// Takes no properties. Anything passed in is a misconfiguration.
    fn init(&mut self, properties: &ResolverProperties) -> Result<(), ConfigurationError> {
        if !properties.is_empty() {
            return Err(ConfigurationError::Unsupported("ActivePassiveResolver"));
        }
        *self.sticky.get_mut().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }

    fn resolve(&self, cluster: &ClusterSnapshot, task: &TaskName) -> Resolution {
        let nodes = cluster.live_node_ids();
        if nodes.is_empty() {
            tracing::warn!(task = %task, "no nodes registered, cannot resolve task location");
            return Resolution::Unresolved;
        }

        let mut sticky = self.sticky.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(node) = sticky.as_ref()
            && cluster.is_live(node)
        {
            return Resolution::Node(node.clone());
        }

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let picked = nodes.choose(&mut *rng).cloned();
        if let Some(node) = &picked {
            tracing::info!(previous = ?sticky.as_ref(), active = %node, "active node selected");
        }
        *sticky = picked.clone();
        picked.into()
    }
}
