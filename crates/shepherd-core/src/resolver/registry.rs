//! ResolverRegistry - selects the resolver for a task.

use std::collections::HashMap;
use std::sync::Arc;

use super::TaskLocationResolver;
use crate::domain::TaskDefinition;

/// A default resolver plus named resolvers tasks can opt into.
///
/// Built during initialisation, read-only afterwards.
#[derive(Clone)]
pub struct ResolverRegistry {
    default: Arc<dyn TaskLocationResolver>,
    named: HashMap<String, Arc<dyn TaskLocationResolver>>,
}

impl ResolverRegistry {
    /// Registry with only a default resolver.
    pub fn new(default: Arc<dyn TaskLocationResolver>) -> Self {
        Self {
            default,
            named: HashMap::new(),
        }
    }

    /// Register `resolver` under `name`. Last registration for a name wins.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        resolver: Arc<dyn TaskLocationResolver>,
    ) -> &mut Self {
        self.named.insert(name.into(), resolver);
        self
    }

    /// Resolver registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn TaskLocationResolver>> {
        self.named.get(name)
    }

    /// Resolver for `task`, or `None` when the task names an unknown policy.
    pub fn for_task(&self, task: &TaskDefinition) -> Option<&Arc<dyn TaskLocationResolver>> {
        match task.policy.as_deref() {
            None => Some(&self.default),
            Some(name) => self.get(name),
        }
    }

    /// Registered policy names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
