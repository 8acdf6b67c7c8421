//! Resolver configuration: flat string key/value pairs.

use std::collections::BTreeMap;

use crate::domain::ConfigurationError;

/// Minimum live-node count before the round-robin resolver places anything.
pub const TASK_SERVER_COUNT: &str = "task_server_count";

/// Comma-separated candidate node ids for the pinned node-set resolver.
pub const TASK_NODES: &str = "task_nodes";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverProperties(BTreeMap<String, String>);

impl ResolverProperties {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set `key`, replacing any earlier value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse an optional positive integer property.
    pub fn positive_usize(&self, key: &str) -> Result<Option<usize>, ConfigurationError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        match raw.trim().parse::<usize>() {
            Ok(0) => Err(ConfigurationError::InvalidProperty {
                key: key.to_string(),
                value: raw.to_string(),
                reason: "must be at least 1".to_string(),
            }),
            Ok(n) => Ok(Some(n)),
            Err(e) => Err(ConfigurationError::InvalidProperty {
                key: key.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Parse a required comma-separated list. Blank entries and duplicates are dropped.
    pub fn required_list(&self, key: &str) -> Result<Vec<String>, ConfigurationError> {
        let raw = self
            .get(key)
            .ok_or_else(|| ConfigurationError::MissingProperty(key.to_string()))?;

        let mut items: Vec<String> = Vec::new();
        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !items.iter().any(|existing| existing == item) {
                items.push(item.to_string());
            }
        }

        if items.is_empty() {
            return Err(ConfigurationError::InvalidProperty {
                key: key.to_string(),
                value: raw.to_string(),
                reason: "list is empty".to_string(),
            });
        }
        Ok(items)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResolverProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for ResolverProperties {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
