//! CoordinatedScheduler - the per-node reconciliation loop.
//!
//! Every node of the cluster runs one of these against the same assignment
//! store. One call to `tick` is one reconciliation pass.
//!
//! # Tick
//! 1. Capture the live set and whether this node currently leads the cluster.
//! 2. Leader only: prune assignment rows when the cleanup cadence, or a pass
//!    that did not finish earlier, asks for it. Rows of departed nodes are
//!    pruned even when the registry cannot be listed.
//! 3. List the registry and stop local tasks whose definition disappeared.
//! 4. For each registered task:
//!    - honour the shared assignment if its node is live;
//!    - otherwise the leader resolves a new placement and writes it, while
//!      followers leave the task alone until that row appears;
//!    - start the task here if the assignment names this node, stop it here
//!      if it names another one.
//!
//! # Single decision maker
//! Placement policies carry state between calls (round-robin counters, the
//! active/passive sticky node). Only the leader resolves, so that state is
//! the cluster's state rather than one copy per node.
//!
//! # Failure handling
//! An unresolved placement leaves local state untouched. Failures of the
//! engine, store or registry are counted in the `TickReport`, logged, and
//! retried on the next tick; they never escape `tick`.

use std::collections::{BTreeMap, BTreeSet};

use super::cleaner::AssignmentCleaner;
use super::context::SchedulerContext;
use super::status::{SchedulerStatus, StateCounts, TickReport};
use crate::cluster::ClusterSnapshot;
use crate::domain::{
    Assignment, LocalTaskState, NodeId, RegistryError, Resolution, TaskDefinition, TaskName,
};

/// Reconciles the tasks of one node with the cluster-wide assignments.
///
/// Owns the local task table; nothing else writes to it. Not `Clone`: a
/// node has exactly one scheduler, usually driven by a `ScheduleManager`.
pub struct CoordinatedScheduler {
    ctx: SchedulerContext,
    cleaner: AssignmentCleaner,
    resolving_frequency: u32,
    ticks: u64,
    cleanups: u64,
    /// Set by the cadence, by `request_cleanup`, and by passes that did not finish.
    cleanup_requested: bool,
    local: BTreeMap<TaskName, LocalTaskState>,
}

impl CoordinatedScheduler {
    /// Create a scheduler over `ctx` that cleans assignments every
    /// `resolving_frequency` ticks. `resolving_frequency` of 0 is treated as 1.
    pub fn new(ctx: SchedulerContext, resolving_frequency: u32) -> Self {
        Self {
            ctx,
            cleaner: AssignmentCleaner::new(),
            resolving_frequency: resolving_frequency.max(1),
            ticks: 0,
            cleanups: 0,
            cleanup_requested: false,
            local: BTreeMap::new(),
        }
    }

    /// Collaborators this scheduler was built with.
    pub fn context(&self) -> &SchedulerContext {
        &self.ctx
    }

    /// Identity of this node, as reported by membership.
    pub fn local_node_id(&self) -> NodeId {
        self.ctx.cluster.local_node_id()
    }

    /// Run the cleaner on the next tick regardless of cadence.
    ///
    /// Only takes effect while this node leads; a follower keeps the request
    /// until it becomes leader.
    pub fn request_cleanup(&mut self) {
        self.cleanup_requested = true;
    }

    /// Last known local state of `task`; `Unassigned` for unknown tasks.
    pub fn local_state(&self, task: &TaskName) -> LocalTaskState {
        self.local
            .get(task)
            .copied()
            .unwrap_or(LocalTaskState::Unassigned)
    }

    /// Counters and the local task table as of the last tick.
    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            node: self.local_node_id(),
            ticks: self.ticks,
            cleanups: self.cleanups,
            tasks: self.local.clone(),
            counts: StateCounts::from_states(self.local.values()),
        }
    }

    /// One reconciliation pass. See the module docs for the steps.
    ///
    /// Never fails: collaborator errors are recorded in the returned report
    /// and the affected work is retried on the next call.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport {
            tick: self.ticks,
            ..Default::default()
        };
        if self.ticks % u64::from(self.resolving_frequency) == 0 {
            self.cleanup_requested = true;
        }
        self.ticks = self.ticks.wrapping_add(1);

        let snapshot = self.ctx.cluster.snapshot().await;
        let leader = self.ctx.cluster.is_leader().await;
        report.leader = leader;

        let names = match self.ctx.registry.list_task_names().await {
            Ok(names) => Some(names),
            Err(e) => {
                tracing::error!(error = %e, "failed to list tasks, skipping placement this tick");
                report.registry_failed = true;
                None
            }
        };

        if leader && self.cleanup_requested {
            self.clean(&snapshot, names.as_ref(), &mut report).await;
        }

        let Some(names) = names else {
            return report;
        };

        self.stop_unregistered(&names, &mut report).await;

        for name in &names {
            self.reconcile(&snapshot, leader, name, &mut report).await;
        }

        tracing::debug!(
            tick = report.tick,
            node = %snapshot.local_node_id(),
            leader,
            live = snapshot.len(),
            tasks = names.len(),
            resolved = report.resolved,
            unresolved = report.unresolved,
            started = report.started,
            stopped = report.stopped,
            "tick complete"
        );
        report
    }

    /// Runs one cleaner pass. The request stays pending unless the pass
    /// covered both departed nodes and unregistered tasks without failures.
    async fn clean(
        &mut self,
        snapshot: &ClusterSnapshot,
        names: Option<&BTreeSet<TaskName>>,
        report: &mut TickReport,
    ) {
        match self
            .cleaner
            .clean(self.ctx.store.as_ref(), snapshot, names)
            .await
        {
            Ok(clean) => {
                report.cleaned_rows = clean.removed();
                report.store_failures += clean.failed;
                if clean.skipped {
                    return;
                }
                self.cleanups += 1;
                report.cleaned = true;
                self.cleanup_requested = names.is_none() || clean.failed > 0;
            }
            Err(e) => {
                tracing::error!(error = %e, "assignment cleanup failed, retrying next tick");
                report.store_failures += 1;
            }
        }
    }

    /// Stop local tasks whose definition has left the registry.
    ///
    /// A task whose stop fails stays in the local table so the stop is
    /// retried on the next tick.
    async fn stop_unregistered(&mut self, names: &BTreeSet<TaskName>, report: &mut TickReport) {
        let gone: Vec<TaskName> = self
            .local
            .keys()
            .filter(|name| !names.contains(*name))
            .cloned()
            .collect();

        for name in gone {
            if self.ctx.engine.is_running(&name).await {
                if let Err(e) = self.ctx.engine.stop(&name).await {
                    tracing::error!(task = %name, error = %e, "failed to stop unregistered task");
                    report.engine_failures += 1;
                    continue;
                }
                tracing::info!(task = %name, "stopped task removed from registry");
                report.stopped += 1;
            }
            self.local.remove(&name);
        }
    }

    async fn reconcile(
        &mut self,
        snapshot: &ClusterSnapshot,
        leader: bool,
        name: &TaskName,
        report: &mut TickReport,
    ) {
        let task = match self.ctx.registry.get_task(name).await {
            Ok(task) => task,
            // removed between listing and lookup
            Err(RegistryError::UnknownTask(_)) => return,
            Err(e) => {
                tracing::error!(task = %name, error = %e, "failed to load task definition");
                return;
            }
        };

        let running = self.ctx.engine.is_running(name).await;
        let state = self.local.entry(name.clone()).or_insert(LocalTaskState::Unassigned);
        if running {
            *state = LocalTaskState::Running;
        }

        if !task.is_active() {
            self.pause(name, running, report).await;
            return;
        }

        let Some((assignment, fresh)) = self.placement(snapshot, leader, &task, report).await
        else {
            return;
        };

        if assignment.is_owned_by(snapshot.local_node_id()) {
            self.run_here(&task, running, fresh, report).await;
        } else {
            self.run_elsewhere(name, &assignment.node_id, running, report).await;
        }
    }

    /// The assignment `task` should follow, and whether it was written on
    /// this tick. `None` leaves local state as it is.
    async fn placement(
        &self,
        snapshot: &ClusterSnapshot,
        leader: bool,
        task: &TaskDefinition,
        report: &mut TickReport,
    ) -> Option<(Assignment, bool)> {
        let name = &task.name;
        let current = match self.ctx.store.get(name).await {
            Ok(current) => current,
            Err(e) => {
                tracing::error!(task = %name, error = %e, "failed to read assignment");
                report.store_failures += 1;
                return None;
            }
        };

        if let Some(assignment) = current
            && snapshot.is_live(&assignment.node_id)
        {
            return Some((assignment, false));
        }

        if !leader {
            tracing::debug!(task = %name, "task has no live assignment, waiting for the leader");
            report.unresolved += 1;
            return None;
        }

        let Some(resolver) = self.ctx.resolvers.for_task(task) else {
            tracing::warn!(
                task = %name,
                policy = ?task.policy,
                "task selects an unknown placement policy"
            );
            report.unresolved += 1;
            return None;
        };

        let node = match resolver.resolve(snapshot, name) {
            Resolution::Node(node) => node,
            Resolution::Unresolved => {
                tracing::debug!(task = %name, resolver = resolver.kind(), "placement unresolved");
                report.unresolved += 1;
                return None;
            }
        };

        let assignment = Assignment::new(name.clone(), node, self.ctx.clock.now());
        if let Err(e) = self
            .ctx
            .store
            .put(name, &assignment.node_id, assignment.resolved_at)
            .await
        {
            tracing::error!(
                task = %name,
                node = %assignment.node_id,
                error = %e,
                "failed to write assignment"
            );
            report.store_failures += 1;
            return None;
        }
        tracing::info!(
            task = %name,
            node = %assignment.node_id,
            resolver = resolver.kind(),
            "task assigned"
        );
        report.resolved += 1;
        Some((assignment, true))
    }

    async fn run_here(
        &mut self,
        task: &TaskDefinition,
        running: bool,
        fresh: bool,
        report: &mut TickReport,
    ) {
        let name = &task.name;
        if !running {
            if let Err(e) = self.ctx.engine.start(name, &task.trigger).await {
                tracing::error!(task = %name, error = %e, "failed to start task, will retry");
                report.engine_failures += 1;
                return;
            }
            tracing::info!(task = %name, "task started on this node");
            report.started += 1;
        }
        self.local.insert(name.clone(), LocalTaskState::Running);

        // The owner refreshes its row every tick as a liveness signal.
        if !fresh {
            let local = self.local_node_id();
            if let Err(e) = self.ctx.store.put(name, &local, self.ctx.clock.now()).await {
                tracing::warn!(task = %name, error = %e, "failed to refresh assignment");
                report.store_failures += 1;
            }
        }
    }

    async fn run_elsewhere(
        &mut self,
        name: &TaskName,
        owner: &NodeId,
        running: bool,
        report: &mut TickReport,
    ) {
        if running {
            if let Err(e) = self.ctx.engine.stop(name).await {
                tracing::error!(task = %name, error = %e, "failed to stop task, will retry");
                report.engine_failures += 1;
                return;
            }
            tracing::info!(task = %name, owner = %owner, "task moved to another node, stopped here");
            report.stopped += 1;
        }
        self.local.insert(name.clone(), LocalTaskState::Idle);
    }

    async fn pause(&mut self, name: &TaskName, running: bool, report: &mut TickReport) {
        if running {
            if let Err(e) = self.ctx.engine.stop(name).await {
                tracing::error!(task = %name, error = %e, "failed to stop deactivated task");
                report.engine_failures += 1;
                return;
            }
            tracing::info!(task = %name, "deactivated task stopped");
            report.stopped += 1;
        }
        self.local.insert(name.clone(), LocalTaskState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ResolverConfig, SchedulerBuilder, SchedulerConfig};
    use crate::domain::{TaskActivation, TriggerDefinition};
    use crate::impls::{
        InMemoryAssignmentStore, InMemoryTaskEngine, InMemoryTaskRegistry, StaticMembership,
    };
    use crate::ports::{AssignmentStore, FixedClock, LocalTaskEngine};
    use crate::resolver::{ResolverKind, TASK_NODES, TASK_SERVER_COUNT};
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;

    struct Harness {
        membership: StaticMembership,
        store: InMemoryAssignmentStore,
        registry: InMemoryTaskRegistry,
        engine: InMemoryTaskEngine,
        clock: Arc<FixedClock>,
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    impl Harness {
        async fn new(local: &str, members: &[&str], tasks: &[&str]) -> Self {
            let registry = InMemoryTaskRegistry::new();
            for task in tasks {
                registry
                    .add(TaskDefinition::new(*task, TriggerDefinition::cron("0 * * * * ?")))
                    .await;
            }
            Self {
                membership: StaticMembership::new(local, members.iter().copied()),
                store: InMemoryAssignmentStore::new(),
                registry,
                engine: InMemoryTaskEngine::new(),
                clock: Arc::new(FixedClock::new(t0())),
            }
        }

        fn scheduler(&self, config: SchedulerConfig) -> CoordinatedScheduler {
            SchedulerBuilder::new()
                .membership(Arc::new(self.membership.clone()))
                .store(Arc::new(self.store.clone()))
                .registry(Arc::new(self.registry.clone()))
                .engine(Arc::new(self.engine.clone()))
                .clock(self.clock.clone())
                .config(config)
                .build()
                .unwrap()
        }

        async fn owner(&self, task: &str) -> Option<NodeId> {
            self.store
                .get(&task.into())
                .await
                .unwrap()
                .map(|row| row.node_id)
        }
    }

    #[tokio::test]
    async fn assigns_and_starts_task_on_single_node() {
        let h = Harness::new("a", &["a"], &["t1"]).await;
        let mut scheduler = h.scheduler(SchedulerConfig::default());

        let report = scheduler.tick().await;
        assert_eq!(report.resolved, 1);
        assert_eq!(report.started, 1);
        assert!(h.engine.is_running(&"t1".into()).await);
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Running);

        let row = h.store.get(&"t1".into()).await.unwrap().unwrap();
        assert_eq!(row.node_id, NodeId::new("a"));
        assert_eq!(row.resolved_at, t0());

        // second tick: no restart, no re-resolution, timestamp refreshed
        h.clock.advance(chrono::Duration::seconds(2));
        let report = scheduler.tick().await;
        assert_eq!(report.started, 0);
        assert_eq!(report.resolved, 0);
        assert_eq!(h.engine.call_counts().await, (1, 0));
        let row = h.store.get(&"t1".into()).await.unwrap().unwrap();
        assert_eq!(row.resolved_at, t0() + chrono::Duration::seconds(2));
    }

    #[tokio::test]
    async fn waits_for_enough_nodes_before_placing() {
        let h = Harness::new("a", &["a"], &["t1"]).await;
        let config = SchedulerConfig {
            resolver: ResolverConfig::new(ResolverKind::RoundRobin)
                .with_property(TASK_SERVER_COUNT, "2"),
            ..Default::default()
        };
        let mut scheduler = h.scheduler(config);

        let report = scheduler.tick().await;
        assert_eq!(report.unresolved, 1);
        assert!(h.store.is_empty().await);
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Unassigned);

        h.membership.join(&NodeId::new("b"));
        let report = scheduler.tick().await;
        assert_eq!(report.resolved, 1);
        // counter 1 over [a, b] picks b
        assert_eq!(h.owner("t1").await, Some(NodeId::new("b")));
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Idle);
        assert!(!h.engine.is_running(&"t1".into()).await);
    }

    #[tokio::test]
    async fn unresolved_tick_keeps_running_task() {
        let h = Harness::new("a", &["a"], &["t1"]).await;
        let mut scheduler = h.scheduler(SchedulerConfig::default());
        scheduler.tick().await;
        assert!(h.engine.is_running(&"t1".into()).await);

        h.membership.set_available(false);
        let report = scheduler.tick().await;
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.stopped, 0);
        assert!(h.engine.is_running(&"t1".into()).await);
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Running);
        // nothing was pruned while membership was unknown
        assert_eq!(h.owner("t1").await, Some(NodeId::new("a")));
    }

    #[tokio::test]
    async fn stops_task_when_assignment_moves_away() {
        let h = Harness::new("a", &["a", "b"], &["t1"]).await;
        h.store.put(&"t1".into(), &"a".into(), t0()).await.unwrap();
        let mut scheduler = h.scheduler(SchedulerConfig::default());

        let report = scheduler.tick().await;
        assert_eq!(report.resolved, 0);
        assert_eq!(report.started, 1);

        h.store.put(&"t1".into(), &"b".into(), t0()).await.unwrap();
        let report = scheduler.tick().await;
        assert_eq!(report.stopped, 1);
        assert!(!h.engine.is_running(&"t1".into()).await);
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Idle);
        // the non-owner does not touch the row
        assert_eq!(h.owner("t1").await, Some(NodeId::new("b")));
    }

    #[tokio::test]
    async fn engine_failure_does_not_block_other_tasks() {
        let h = Harness::new("a", &["a"], &["t1", "t2"]).await;
        h.engine.fail_task(&"t1".into()).await;
        let mut scheduler = h.scheduler(SchedulerConfig::default());

        let report = scheduler.tick().await;
        assert_eq!(report.engine_failures, 1);
        assert_eq!(report.started, 1);
        assert!(h.engine.is_running(&"t2".into()).await);
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Unassigned);

        h.engine.heal(&"t1".into()).await;
        let report = scheduler.tick().await;
        assert_eq!(report.started, 1);
        assert_eq!(report.engine_failures, 0);
        assert!(h.engine.is_running(&"t1".into()).await);
    }

    #[tokio::test]
    async fn store_outage_abandons_the_tick_decisions() {
        let h = Harness::new("a", &["a"], &["t1", "t2"]).await;
        h.store.set_available(false);
        let mut scheduler = h.scheduler(SchedulerConfig::default());

        let report = scheduler.tick().await;
        // cleanup + one read per task
        assert_eq!(report.store_failures, 3);
        assert_eq!(report.started, 0);
        assert!(h.engine.running_tasks().await.is_empty());

        h.store.set_available(true);
        let report = scheduler.tick().await;
        assert_eq!(report.started, 2);
    }

    #[tokio::test]
    async fn registry_outage_skips_the_tick() {
        let h = Harness::new("a", &["a"], &["t1"]).await;
        h.registry.set_available(false);
        let mut scheduler = h.scheduler(SchedulerConfig::default());

        let report = scheduler.tick().await;
        assert!(report.registry_failed);
        assert!(report.had_failures());
        assert!(h.engine.running_tasks().await.is_empty());
        assert_eq!(scheduler.status().ticks, 1);
    }

    #[tokio::test]
    async fn deactivated_task_is_stopped_and_keeps_its_row() {
        let h = Harness::new("a", &["a"], &["t1"]).await;
        let mut scheduler = h.scheduler(SchedulerConfig::default());
        scheduler.tick().await;

        h.registry
            .set_activation(&"t1".into(), TaskActivation::Deactivated)
            .await;
        let report = scheduler.tick().await;
        assert_eq!(report.stopped, 1);
        assert!(!h.engine.is_running(&"t1".into()).await);
        assert_eq!(h.owner("t1").await, Some(NodeId::new("a")));

        h.registry
            .set_activation(&"t1".into(), TaskActivation::Active)
            .await;
        let report = scheduler.tick().await;
        assert_eq!(report.started, 1);
        assert_eq!(report.resolved, 0);
    }

    #[tokio::test]
    async fn removed_task_is_stopped_and_forgotten() {
        let h = Harness::new("a", &["a"], &["t1", "t2"]).await;
        let mut scheduler = h.scheduler(SchedulerConfig::default());
        scheduler.tick().await;

        h.registry.remove(&"t1".into()).await;
        let report = scheduler.tick().await;
        assert_eq!(report.stopped, 1);
        assert_eq!(report.cleaned_rows, 1);
        assert_eq!(h.engine.running_tasks().await, vec![TaskName::new("t2")]);
        assert_eq!(h.owner("t1").await, None);
        assert!(!scheduler.status().tasks.contains_key(&TaskName::new("t1")));
    }

    #[tokio::test]
    async fn cleanup_runs_every_nth_tick_or_on_request() {
        let h = Harness::new("a", &["a"], &["t1"]).await;
        let config = SchedulerConfig {
            resolving_frequency: 3,
            ..Default::default()
        };
        let mut scheduler = h.scheduler(config);

        let mut cleaned = Vec::new();
        for _ in 0..7 {
            cleaned.push(scheduler.tick().await.cleaned);
        }
        assert_eq!(cleaned, vec![true, false, false, true, false, false, true]);

        scheduler.request_cleanup();
        assert!(scheduler.tick().await.cleaned);
        assert!(!scheduler.tick().await.cleaned);
        assert_eq!(scheduler.status().cleanups, 4);
    }

    #[tokio::test]
    async fn stale_assignment_is_pruned_and_reresolved() {
        let h = Harness::new("a", &["a"], &["t1"]).await;
        h.store.put(&"t1".into(), &"gone".into(), t0()).await.unwrap();
        let mut scheduler = h.scheduler(SchedulerConfig::default());

        let report = scheduler.tick().await;
        assert_eq!(report.cleaned_rows, 1);
        assert_eq!(report.resolved, 1);
        assert_eq!(h.owner("t1").await, Some(NodeId::new("a")));
        assert!(h.engine.is_running(&"t1".into()).await);
    }

    #[tokio::test]
    async fn unknown_policy_leaves_task_unplaced() {
        let h = Harness::new("a", &["a"], &[]).await;
        h.registry
            .add(
                TaskDefinition::new("t1", TriggerDefinition::cron("0 * * * * ?"))
                    .with_policy("missing"),
            )
            .await;
        let mut scheduler = h.scheduler(SchedulerConfig::default());

        let report = scheduler.tick().await;
        assert_eq!(report.unresolved, 1);
        assert!(h.store.is_empty().await);
        assert!(h.engine.running_tasks().await.is_empty());
    }

    #[tokio::test]
    async fn per_task_policy_restricts_placement() {
        let h = Harness::new("a", &["a", "b", "c"], &["plain"]).await;
        h.registry
            .add(
                TaskDefinition::new("pinned", TriggerDefinition::cron("0 * * * * ?"))
                    .with_policy("only-c"),
            )
            .await;
        let mut config = SchedulerConfig::default();
        config.policies.insert(
            "only-c".to_string(),
            ResolverConfig::new(ResolverKind::PinnedNodeSet).with_property(TASK_NODES, "c"),
        );
        let mut scheduler = h.scheduler(config);

        let report = scheduler.tick().await;
        assert_eq!(report.resolved, 2);
        assert_eq!(h.owner("pinned").await, Some(NodeId::new("c")));
        assert_eq!(scheduler.local_state(&"pinned".into()), LocalTaskState::Idle);
    }

    #[tokio::test]
    async fn deactivated_task_is_never_started() {
        let h = Harness::new("a", &["a"], &[]).await;
        h.registry
            .add(TaskDefinition::new("t1", TriggerDefinition::cron("0 * * * * ?")).deactivated())
            .await;
        let mut scheduler = h.scheduler(SchedulerConfig::default());

        let report = scheduler.tick().await;
        assert_eq!(report.resolved, 0);
        assert_eq!(report.started, 0);
        assert!(h.store.is_empty().await);
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Idle);
    }

    #[tokio::test]
    async fn follower_waits_for_the_leader() {
        let h = Harness::new("b", &["a", "b"], &["t1"]).await;
        h.store.put(&"stale".into(), &"gone".into(), t0()).await.unwrap();
        let mut scheduler = h.scheduler(SchedulerConfig::default());

        let report = scheduler.tick().await;
        assert!(!report.leader);
        assert!(!report.cleaned);
        assert_eq!(report.unresolved, 1);
        assert_eq!(h.owner("t1").await, None);
        assert_eq!(h.owner("stale").await, Some(NodeId::new("gone")));

        // once the leader has written a row, the follower acts on it
        h.store.put(&"t1".into(), &"b".into(), t0()).await.unwrap();
        let report = scheduler.tick().await;
        assert_eq!(report.resolved, 0);
        assert_eq!(report.started, 1);
        assert!(h.engine.is_running(&"t1".into()).await);
    }

    #[tokio::test]
    async fn follower_takes_over_when_the_leader_leaves() {
        let h = Harness::new("b", &["a", "b"], &["t1"]).await;
        h.store.put(&"t1".into(), &"a".into(), t0()).await.unwrap();
        let config = SchedulerConfig {
            resolving_frequency: 5,
            ..Default::default()
        };
        let mut scheduler = h.scheduler(config);

        let report = scheduler.tick().await;
        assert!(!report.leader);
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Idle);

        h.membership.leave(&NodeId::new("a"));
        let report = scheduler.tick().await;
        assert!(report.leader);
        // the cleanup due on tick 0 was kept for the new leader
        assert!(report.cleaned);
        assert_eq!(report.cleaned_rows, 1);
        assert_eq!(report.resolved, 1);
        assert_eq!(h.owner("t1").await, Some(NodeId::new("b")));
        assert!(h.engine.is_running(&"t1".into()).await);
    }

    #[tokio::test]
    async fn registry_outage_still_prunes_departed_nodes() {
        let h = Harness::new("a", &["a"], &["t1"]).await;
        h.store.put(&"t1".into(), &"gone".into(), t0()).await.unwrap();
        h.store.put(&"retired".into(), &"a".into(), t0()).await.unwrap();
        h.registry.set_available(false);
        let config = SchedulerConfig {
            resolving_frequency: 3,
            ..Default::default()
        };
        let mut scheduler = h.scheduler(config);

        let report = scheduler.tick().await;
        assert!(report.registry_failed);
        assert!(report.cleaned);
        assert_eq!(h.owner("t1").await, None);
        // without a task list an unregistered task looks like any other
        assert_eq!(h.owner("retired").await, Some(NodeId::new("a")));

        // off cadence, yet the partial pass is completed on the next tick
        h.registry.set_available(true);
        let report = scheduler.tick().await;
        assert!(report.cleaned);
        assert_eq!(h.owner("retired").await, None);
        assert!(h.engine.is_running(&"t1".into()).await);

        assert!(!scheduler.tick().await.cleaned);
    }

    #[tokio::test]
    async fn failed_cleanup_is_retried_on_the_next_tick() {
        let h = Harness::new("a", &["a"], &[]).await;
        h.store.put(&"t1".into(), &"gone".into(), t0()).await.unwrap();
        h.store.set_available(false);
        let config = SchedulerConfig {
            resolving_frequency: 3,
            ..Default::default()
        };
        let mut scheduler = h.scheduler(config);

        let report = scheduler.tick().await;
        assert!(!report.cleaned);
        assert_eq!(report.store_failures, 1);

        h.store.set_available(true);
        let report = scheduler.tick().await;
        assert!(report.cleaned);
        assert_eq!(report.cleaned_rows, 1);
        assert!(h.store.is_empty().await);

        assert!(!scheduler.tick().await.cleaned);
        assert_eq!(scheduler.status().cleanups, 1);
    }

    #[tokio::test]
    async fn failed_stop_is_retried_when_assignment_moves() {
        let h = Harness::new("a", &["a", "b"], &["t1"]).await;
        h.store.put(&"t1".into(), &"a".into(), t0()).await.unwrap();
        let mut scheduler = h.scheduler(SchedulerConfig::default());
        scheduler.tick().await;
        assert!(h.engine.is_running(&"t1".into()).await);

        h.store.put(&"t1".into(), &"b".into(), t0()).await.unwrap();
        h.engine.fail_task(&"t1".into()).await;
        let report = scheduler.tick().await;
        assert_eq!(report.engine_failures, 1);
        assert_eq!(report.stopped, 0);
        assert!(h.engine.is_running(&"t1".into()).await);
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Running);

        h.engine.heal(&"t1".into()).await;
        let report = scheduler.tick().await;
        assert_eq!(report.stopped, 1);
        assert!(!h.engine.is_running(&"t1".into()).await);
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Idle);
    }

    #[tokio::test]
    async fn failed_stop_of_unregistered_task_is_retried() {
        let h = Harness::new("a", &["a"], &["t1"]).await;
        let mut scheduler = h.scheduler(SchedulerConfig::default());
        scheduler.tick().await;

        h.registry.remove(&"t1".into()).await;
        h.engine.fail_task(&"t1".into()).await;
        let report = scheduler.tick().await;
        assert_eq!(report.engine_failures, 1);
        assert!(h.engine.is_running(&"t1".into()).await);
        assert_eq!(scheduler.local_state(&"t1".into()), LocalTaskState::Running);

        h.engine.heal(&"t1".into()).await;
        let report = scheduler.tick().await;
        assert_eq!(report.stopped, 1);
        assert!(!h.engine.is_running(&"t1".into()).await);
        assert!(!scheduler.status().tasks.contains_key(&TaskName::new("t1")));
    }
}
