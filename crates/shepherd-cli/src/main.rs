use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tokio::time::sleep;

use shepherd_core::app::{ScheduleManager, SchedulerBuilder, SchedulerConfig};
use shepherd_core::domain::{
    EngineError, NodeId, SchedulerError, TaskDefinition, TaskName, TriggerDefinition,
};
use shepherd_core::impls::{
    InMemoryAssignmentStore, InMemoryTaskEngine, InMemoryTaskRegistry, StaticMembership,
};
use shepherd_core::ports::{AssignmentStore, LocalTaskEngine};

/// Demo layout, optionally read from a JSON file given as the first argument.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    nodes: Vec<String>,
    tasks: Vec<DemoTask>,
    /// Node taken down halfway through the demo.
    crash: Option<String>,
    /// Scheduler periods to wait before each placement report.
    settle_periods: u32,
    scheduler: SchedulerConfig,
}

#[derive(Debug, Deserialize)]
struct DemoTask {
    name: String,
    cron: String,
    #[serde(default)]
    policy: Option<String>,
    /// Deactivated tasks are registered but never run.
    #[serde(default = "active_by_default")]
    active: bool,
}

fn active_by_default() -> bool {
    true
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["node-1".into(), "node-2".into(), "node-3".into()],
            tasks: (1..=5)
                .map(|i| DemoTask {
                    name: format!("report-{i}"),
                    cron: "0 */5 * * * ?".into(),
                    policy: None,
                    active: true,
                })
                .collect(),
            crash: Some("node-2".into()),
            settle_periods: 3,
            scheduler: SchedulerConfig {
                initial_delay_secs: 1,
                period_secs: 1,
                ..Default::default()
            },
        }
    }
}

/// Engine that announces what it runs; the actual bookkeeping is in-memory.
struct ConsoleEngine {
    node: NodeId,
    inner: InMemoryTaskEngine,
}

#[async_trait]
impl LocalTaskEngine for ConsoleEngine {
    async fn start(&self, task: &TaskName, trigger: &TriggerDefinition) -> Result<(), EngineError> {
        println!("[{}] start {} {}", self.node, task, trigger.as_value());
        self.inner.start(task, trigger).await
    }

    async fn stop(&self, task: &TaskName) -> Result<(), EngineError> {
        println!("[{}] stop {}", self.node, task);
        self.inner.stop(task).await
    }

    async fn is_running(&self, task: &TaskName) -> bool {
        self.inner.is_running(task).await
    }
}

struct DemoNode {
    id: NodeId,
    manager: ScheduleManager,
    left: bool,
}

/// Every simulated node of the demo, sharing one membership board and store.
struct DemoCluster {
    membership: StaticMembership,
    store: InMemoryAssignmentStore,
    nodes: Vec<DemoNode>,
}

fn load_config() -> Result<DemoConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(DemoConfig::default()),
    }
}

impl DemoCluster {
    /// One scheduler per configured node. Nothing runs until `run`.
    async fn build(config: &DemoConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let first = config.nodes.first().ok_or("at least one node is required")?;
        let membership =
            StaticMembership::new(first.as_str(), config.nodes.iter().map(String::as_str));
        let store = InMemoryAssignmentStore::new();
        let registry = InMemoryTaskRegistry::new();
        for task in &config.tasks {
            let mut def =
                TaskDefinition::new(task.name.as_str(), TriggerDefinition::cron(&task.cron));
            if let Some(policy) = &task.policy {
                def = def.with_policy(policy.as_str());
            }
            if !task.active {
                def = def.deactivated();
            }
            registry.add(def).await;
        }

        let mut nodes = Vec::new();
        for id in &config.nodes {
            let node = NodeId::new(id.as_str());
            let scheduler = SchedulerBuilder::new()
                .membership(Arc::new(membership.for_node(node.clone())))
                .store(Arc::new(store.clone()))
                .registry(Arc::new(registry.clone()))
                .engine(Arc::new(ConsoleEngine {
                    node: node.clone(),
                    inner: InMemoryTaskEngine::new(),
                }))
                .config(config.scheduler.clone())
                .build()?;
            nodes.push(DemoNode {
                id: node,
                manager: ScheduleManager::new(scheduler),
                left: false,
            });
        }

        Ok(Self {
            membership,
            store,
            nodes,
        })
    }

    /// Start every node, report placement, take one node down, report again.
    async fn run(&mut self, config: &DemoConfig) -> Result<(), Box<dyn std::error::Error>> {
        for node in &mut self.nodes {
            node.manager
                .start(config.scheduler.initial_delay(), config.scheduler.period())
                .await?;
        }

        let settle = config.scheduler.initial_delay()
            + config.scheduler.period() * config.settle_periods.max(1);

        sleep(settle).await;
        println!("placement:");
        self.print_placement().await;

        let Some(crash) = &config.crash else {
            return Ok(());
        };
        let crash = NodeId::new(crash.as_str());
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == crash) else {
            return Err(format!("unknown node to crash: {crash}").into());
        };
        node.manager.stop().await?;
        node.left = true;
        self.membership.leave(&crash);
        println!("{crash} left the cluster");

        sleep(settle).await;
        println!("placement after {crash} left:");
        self.print_placement().await;
        Ok(())
    }

    async fn print_placement(&self) {
        match self.store.all_assignments().await {
            Ok(rows) => {
                for row in rows {
                    println!("  {} -> {}", row.task_name, row.node_id);
                }
            }
            Err(e) => println!("  assignments unavailable: {e}"),
        }
        for node in self.nodes.iter().filter(|n| !n.left) {
            let status = node.manager.scheduler().lock().await.status();
            match serde_json::to_string(&status.counts) {
                Ok(counts) => println!("  {} ticks={} {}", node.id, status.ticks, counts),
                Err(e) => println!("  {} status unavailable: {e}", node.id),
            }
        }
    }

    /// Signal every loop first, then wait for each in-flight tick to finish.
    async fn shutdown(&mut self) {
        for node in &self.nodes {
            node.manager.request_shutdown();
        }
        for node in &mut self.nodes {
            match node.manager.stop().await {
                Ok(()) | Err(SchedulerError::NotRunning) => {}
                Err(e) => tracing::warn!(node = %node.id, error = %e, "failed to stop scheduler"),
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load demo config");
            std::process::exit(1);
        }
    };

    let mut cluster = match DemoCluster::build(&config).await {
        Ok(cluster) => cluster,
        Err(e) => {
            tracing::error!(error = %e, "failed to build demo cluster");
            std::process::exit(1);
        }
    };

    let outcome = tokio::select! {
        result = cluster.run(&config) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, stopping schedulers");
            Ok(())
        }
    };
    cluster.shutdown().await;

    if let Err(e) = outcome {
        tracing::error!(error = %e, "demo failed");
        std::process::exit(1);
    }
}
