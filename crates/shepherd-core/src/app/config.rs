//! Scheduler configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::ConfigurationError;
use crate::resolver::{ResolverKind, ResolverProperties, TaskLocationResolver};

/// Cycle parameters of the coordinated scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds before the first tick.
    pub initial_delay_secs: u64,

    /// Seconds between the end of one tick and the start of the next.
    pub period_secs: u64,

    /// Run the assignment cleaner every Nth tick (1 = every tick). A pass that
    /// does not complete is retried on the following tick.
    pub resolving_frequency: u32,

    /// Default placement policy.
    pub resolver: ResolverConfig,

    /// Named policies tasks can select through their `policy` field.
    pub policies: BTreeMap<String, ResolverConfig>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 5,
            period_secs: 2,
            resolving_frequency: 1,
            resolver: ResolverConfig::default(),
            policies: BTreeMap::new(),
        }
    }
}

impl SchedulerConfig {
    /// `initial_delay_secs` as a `Duration`.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    /// `period_secs` as a `Duration`.
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    /// Reject a zero period or a zero cleanup frequency.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.period_secs == 0 {
            return Err(ConfigurationError::InvalidScheduler(
                "period_secs must be at least 1".to_string(),
            ));
        }
        if self.resolving_frequency == 0 {
            return Err(ConfigurationError::InvalidScheduler(
                "resolving_frequency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A resolver kind plus its string properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub kind: ResolverKind,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            kind: ResolverKind::RoundRobin,
            properties: BTreeMap::new(),
        }
    }
}

impl ResolverConfig {
    /// Resolver of `kind` with no properties.
    pub fn new(kind: ResolverKind) -> Self {
        Self {
            kind,
            properties: BTreeMap::new(),
        }
    }

    /// Add one property, replacing any earlier value.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Construct and initialise the configured resolver.
    pub fn build(&self) -> Result<Box<dyn TaskLocationResolver>, ConfigurationError> {
        self.kind
            .build(&ResolverProperties::from(self.properties.clone()))
    }
}
