//! SchedulerBuilder - wiring and start-up validation.
//!
//! Everything is checked in `build()`: missing collaborators, invalid cycle
//! parameters and resolver configuration errors all fail there, before any
//! tick runs.

use std::sync::Arc;

use super::config::SchedulerConfig;
use super::context::SchedulerContext;
use super::scheduler::CoordinatedScheduler;
use crate::cluster::ClusterView;
use crate::domain::ConfigurationError;
use crate::ports::{
    AssignmentStore, Clock, ClusterMembership, LocalTaskEngine, SystemClock, TaskRegistry,
};
use crate::resolver::{ResolverRegistry, TaskLocationResolver};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("scheduler component '{0}' was not provided")]
    MissingComponent(&'static str),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// ```ignore
/// let scheduler = SchedulerBuilder::new()
///     .membership(membership)
///     .store(store)
///     .registry(registry)
///     .engine(engine)
///     .config(config)
///     .build()?;
/// ```
pub struct SchedulerBuilder {
    membership: Option<Arc<dyn ClusterMembership>>,
    store: Option<Arc<dyn AssignmentStore>>,
    registry: Option<Arc<dyn TaskRegistry>>,
    engine: Option<Arc<dyn LocalTaskEngine>>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    default_resolver: Option<Arc<dyn TaskLocationResolver>>,
    named_resolvers: Vec<(String, Arc<dyn TaskLocationResolver>)>,
}

impl SchedulerBuilder {
    pub fn new() -> Self {
        Self {
            membership: None,
            store: None,
            registry: None,
            engine: None,
            clock: Arc::new(SystemClock),
            config: SchedulerConfig::default(),
            default_resolver: None,
            named_resolvers: Vec::new(),
        }
    }

    /// Membership service of this node. Required.
    pub fn membership(mut self, membership: Arc<dyn ClusterMembership>) -> Self {
        self.membership = Some(membership);
        self
    }

    /// Assignment store shared by the cluster. Required.
    pub fn store(mut self, store: Arc<dyn AssignmentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Task registry. Required.
    pub fn registry(mut self, registry: Arc<dyn TaskRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Local task engine. Required.
    pub fn engine(mut self, engine: Arc<dyn LocalTaskEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Clock used to stamp assignments. Defaults to `SystemClock`.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cycle parameters and resolver configuration. Defaults apply otherwise.
    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an already initialised resolver as the default instead of `config.resolver`.
    pub fn resolver(mut self, resolver: Arc<dyn TaskLocationResolver>) -> Self {
        self.default_resolver = Some(resolver);
        self
    }

    /// Register an already initialised resolver under `name`.
    pub fn policy(mut self, name: impl Into<String>, resolver: Arc<dyn TaskLocationResolver>) -> Self {
        self.named_resolvers.push((name.into(), resolver));
        self
    }

    /// Validate the configuration, build the resolvers and assemble the
    /// scheduler.
    ///
    /// # Errors
    /// A missing collaborator, an invalid cycle parameter or a resolver that
    /// rejects its properties.
    pub fn build(self) -> Result<CoordinatedScheduler, BuildError> {
        self.config.validate()?;

        let membership = self.membership.ok_or(BuildError::MissingComponent("membership"))?;
        let store = self.store.ok_or(BuildError::MissingComponent("store"))?;
        let registry = self.registry.ok_or(BuildError::MissingComponent("registry"))?;
        let engine = self.engine.ok_or(BuildError::MissingComponent("engine"))?;

        let default = match self.default_resolver {
            Some(resolver) => resolver,
            None => Arc::from(self.config.resolver.build()?),
        };
        let mut resolvers = ResolverRegistry::new(default);
        for (name, policy) in &self.config.policies {
            resolvers.register(name.clone(), Arc::from(policy.build()?));
        }
        for (name, resolver) in self.named_resolvers {
            resolvers.register(name, resolver);
        }

        let ctx = SchedulerContext {
            cluster: ClusterView::new(membership),
            store,
            registry,
            engine,
            resolvers,
            clock: self.clock,
        };
        Ok(CoordinatedScheduler::new(ctx, self.config.resolving_frequency))
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
