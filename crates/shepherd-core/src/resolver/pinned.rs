//! PinnedNodeSetResolver - round-robin restricted to an approved node subset.

use std::sync::atomic::{AtomicU64, Ordering};

use super::properties::{ResolverProperties, TASK_NODES};
use super::TaskLocationResolver;
use crate::cluster::ClusterSnapshot;
use crate::domain::{ConfigurationError, NodeId, Resolution, TaskName};

/// Places tasks only on nodes listed in `task_nodes`.
///
/// Walks the candidate list round-robin; candidates that are not live are
/// dropped from a working copy until a live one is found or none remain.
#[derive(Debug, Default)]
pub struct PinnedNodeSetResolver {
    candidates: Vec<NodeId>,
    counter: AtomicU64,
}

impl PinnedNodeSetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configured candidate ids, in configuration order.
    pub fn candidates(&self) -> &[NodeId] {
        &self.candidates
    }
}

impl TaskLocationResolver for PinnedNodeSetResolver {
    fn kind(&self) -> &'static str {
        "pinned_node_set"
    }

    fn init(&mut self, properties: &ResolverProperties) -> Result<(), ConfigurationError> {
        self.candidates = properties
            .required_list(TASK_NODES)?
            .into_iter()
            .map(NodeId::from)
            .collect();
        *self.counter.get_mut() = 0;
        Ok(())
    }

    fn resolve(&self, cluster: &ClusterSnapshot, task: &TaskName) -> Resolution {
        let mut working = self.candidates.clone();
        while !working.is_empty() {
            let c = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
            let index = (c % working.len() as u64) as usize;
            if cluster.is_live(&working[index]) {
                return Resolution::Node(working.swap_remove(index));
            }
            working.remove(index);
        }

        tracing::warn!(
            task = %task,
            candidates = ?self.candidates,
            "none of the configured task nodes is live"
        );
        Resolution::Unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn cluster(nodes: &[&str]) -> ClusterSnapshot {
        ClusterSnapshot::new(
            NodeId::new("local"),
            nodes.iter().map(|n| NodeId::new(*n)).collect(),
        )
    }

    fn pinned(nodes: &str) -> PinnedNodeSetResolver {
        let mut resolver = PinnedNodeSetResolver::new();
        resolver
            .init(&ResolverProperties::new().with(TASK_NODES, nodes))
            .unwrap();
        resolver
    }

    #[test]
    fn never_leaves_the_candidate_set() {
        let resolver = pinned("b,d");
        let view = cluster(&["a", "b", "c", "d", "e"]);
        let allowed: HashSet<NodeId> = ["b", "d"].into_iter().map(NodeId::from).collect();

        let mut seen = HashSet::new();
        for i in 0..50 {
            let node = resolver
                .resolve(&view, &TaskName::new(format!("t{i}")))
                .node()
                .cloned()
                .unwrap();
            assert!(allowed.contains(&node), "{node} is not a candidate");
            seen.insert(node);
        }
        assert_eq!(seen, allowed);
    }

    #[test]
    fn skips_candidates_that_are_down() {
        let resolver = pinned("a,b,c");
        let view = cluster(&["c", "x"]);
        for _ in 0..10 {
            assert_eq!(resolver.resolve(&view, &"t".into()), Resolution::Node("c".into()));
        }
    }

    #[test]
    fn unresolved_when_no_candidate_is_live() {
        let resolver = pinned("a,b");
        assert_eq!(
            resolver.resolve(&cluster(&["x", "y"]), &"t".into()),
            Resolution::Unresolved
        );
    }

    #[test]
    fn init_requires_a_non_empty_list() {
        let mut resolver = PinnedNodeSetResolver::new();
        assert_eq!(
            resolver.init(&ResolverProperties::new()),
            Err(ConfigurationError::MissingProperty(TASK_NODES.to_string()))
        );
        assert!(resolver
            .init(&ResolverProperties::new().with(TASK_NODES, ",,"))
            .is_err());
        assert!(resolver.candidates().is_empty());
    }

    #[test]
    fn uninitialised_resolver_places_nothing() {
        let resolver = PinnedNodeSetResolver::new();
        assert_eq!(
            resolver.resolve(&cluster(&["a"]), &"t".into()),
            Resolution::Unresolved
        );
    }
}
