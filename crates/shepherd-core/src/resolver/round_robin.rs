//! RoundRobinResolver - spreads tasks over the live set by call count.

use std::sync::atomic::{AtomicU64, Ordering};

use super::properties::{ResolverProperties, TASK_SERVER_COUNT};
use super::TaskLocationResolver;
use crate::cluster::ClusterSnapshot;
use crate::domain::{ConfigurationError, Resolution, TaskName};

const DEFAULT_TASK_SERVER_COUNT: usize = 1;

/// Picks `live[c mod n]` for a monotonically increasing counter `c`.
///
/// Balances by number of resolutions, not by current load. Resolution is
/// withheld until at least `task_server_count` nodes are live.
#[derive(Debug)]
pub struct RoundRobinResolver {
    counter: AtomicU64,
    task_server_count: usize,
}

impl RoundRobinResolver {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            task_server_count: DEFAULT_TASK_SERVER_COUNT,
        }
    }

    /// Resolver that waits for `task_server_count` live nodes.
    pub fn with_task_server_count(task_server_count: usize) -> Self {
        Self {
            counter: AtomicU64::new(0),
            task_server_count: task_server_count.max(1),
        }
    }

    pub fn task_server_count(&self) -> usize {
        self.task_server_count
    }
}

impl Default for RoundRobinResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskLocationResolver for RoundRobinResolver {
    fn kind(&self) -> &'static str {
        "round_robin"
    }

    fn init(&mut self, properties: &ResolverProperties) -> Result<(), ConfigurationError> {
        self.task_server_count = properties
            .positive_usize(TASK_SERVER_COUNT)?
            .unwrap_or(DEFAULT_TASK_SERVER_COUNT);
        *self.counter.get_mut() = 0;
        Ok(())
    }

    fn resolve(&self, cluster: &ClusterSnapshot, task: &TaskName) -> Resolution {
        let nodes = cluster.live_node_ids();
        let n = nodes.len();
        if n == 0 {
            tracing::warn!(task = %task, "no nodes registered, cannot resolve task location");
            return Resolution::Unresolved;
        }
        if n < self.task_server_count {
            tracing::warn!(
                task = %task,
                live = n,
                required = self.task_server_count,
                "not enough nodes in the cluster, waiting before resolving"
            );
            return Resolution::Unresolved;
        }

        // u64 wraps after 2^64 calls; modulo on an unsigned value keeps cycling.
        let c = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let index = (c % n as u64) as usize;
        Resolution::Node(nodes[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeId;
    use rstest::rstest;
    use std::collections::HashMap;

    fn snapshot(nodes: &[&str]) -> ClusterSnapshot {
        ClusterSnapshot::new(
            NodeId::new(nodes.first().copied().unwrap_or("local")),
            nodes.iter().map(|n| NodeId::new(*n)).collect(),
        )
    }

    #[test]
    fn empty_cluster_is_unresolved() {
        let resolver = RoundRobinResolver::new();
        let res = resolver.resolve(&ClusterSnapshot::new(NodeId::new("a"), vec![]), &"t".into());
        assert_eq!(res, Resolution::Unresolved);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(3, 1)]
    #[case(3, 4)]
    #[case(5, 2)]
    fn every_node_is_picked_k_times_after_k_times_n_calls(#[case] n: usize, #[case] k: usize) {
        let names: Vec<String> = (0..n).map(|i| format!("node-{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let cluster = snapshot(&refs);
        let resolver = RoundRobinResolver::new();
        let task = TaskName::new("same-task");

        let mut hits: HashMap<NodeId, usize> = HashMap::new();
        for _ in 0..k * n {
            let node = resolver.resolve(&cluster, &task).node().cloned().unwrap();
            *hits.entry(node).or_default() += 1;
        }

        assert_eq!(hits.len(), n);
        assert!(hits.values().all(|&count| count == k));
    }

    #[test]
    fn waits_for_task_server_count_and_resumes_without_restart() {
        let mut resolver = RoundRobinResolver::new();
        resolver
            .init(&ResolverProperties::new().with(TASK_SERVER_COUNT, "2"))
            .unwrap();
        let task = TaskName::new("T1");

        assert_eq!(resolver.resolve(&snapshot(&["A"]), &task), Resolution::Unresolved);

        // counter = 1 -> index 1 of [A, B]
        let two = snapshot(&["A", "B"]);
        assert_eq!(resolver.resolve(&two, &task), Resolution::Node("B".into()));
        // counter = 2 -> index 0
        assert_eq!(resolver.resolve(&two, &task), Resolution::Node("A".into()));

        assert_eq!(resolver.resolve(&snapshot(&["A"]), &task), Resolution::Unresolved);
    }

    #[test]
    fn unresolved_calls_do_not_advance_the_cursor() {
        let resolver = RoundRobinResolver::with_task_server_count(2);
        let task = TaskName::new("t");
        for _ in 0..5 {
            resolver.resolve(&snapshot(&["A"]), &task);
        }
        assert_eq!(
            resolver.resolve(&snapshot(&["A", "B"]), &task),
            Resolution::Node("B".into())
        );
    }

    #[test]
    fn counter_wraparound_keeps_cycling() {
        let resolver = RoundRobinResolver::new();
        resolver.counter.store(u64::MAX - 1, Ordering::Relaxed);
        let cluster = snapshot(&["A", "B", "C"]);
        let task = TaskName::new("t");

        // c = u64::MAX, then 0, then 1
        let picks: Vec<Resolution> = (0..3).map(|_| resolver.resolve(&cluster, &task)).collect();
        assert_eq!(
            picks,
            vec![
                Resolution::Node(["A", "B", "C"][(u64::MAX % 3) as usize].into()),
                Resolution::Node("A".into()),
                Resolution::Node("B".into()),
            ]
        );
    }

    #[test]
    fn init_rejects_malformed_count_and_reinit_resets() {
        let mut resolver = RoundRobinResolver::new();
        let err = resolver
            .init(&ResolverProperties::new().with(TASK_SERVER_COUNT, "abc"))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidProperty { .. }));

        resolver
            .init(&ResolverProperties::new().with(TASK_SERVER_COUNT, "3"))
            .unwrap();
        assert_eq!(resolver.task_server_count(), 3);
        resolver.init(&ResolverProperties::new()).unwrap();
        assert_eq!(resolver.task_server_count(), 1);
    }
}
