//! Desired-state resource descriptors

use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Desired configuration for a single cloud resource.
///
/// A descriptor is pure data: constructing one has no remote effect. The
/// parent key and `depends_on` keys form the ownership tree the engine
/// orders creation and deletion by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "mysql-server", "storage-account")
    pub resource_type: String,

    /// Logical identifier, unique per type within a run
    pub id: String,

    /// Provider name
    pub provider: String,

    /// Resource-specific configuration
    pub config: serde_json::Value,

    /// Sensitive inputs, kept out of `config` so they never serialize
    /// or log in the clear
    pub secrets: BTreeMap<String, SecretString>,

    /// Key of the owning resource, if any. A child is created strictly
    /// after its parent and deleted strictly before it.
    pub parent: Option<String>,

    /// Additional keys that must exist before this resource is submitted
    pub depends_on: Vec<String>,

    /// Protected resources refuse deletion and replacement without an
    /// explicit force override.
    pub protect: bool,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        provider: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            provider: provider.into(),
            config,
            secrets: BTreeMap::new(),
            parent: None,
            depends_on: Vec::new(),
            protect: false,
        }
    }

    pub fn with_parent(mut self, parent_key: impl Into<String>) -> Self {
        self.parent = Some(parent_key.into());
        self
    }

    pub fn with_dependency(mut self, key: impl Into<String>) -> Self {
        self.depends_on.push(key.into());
        self
    }

    pub fn with_secret(mut self, name: impl Into<String>, value: SecretString) -> Self {
        self.secrets.insert(name.into(), value);
        self
    }

    pub fn protected(mut self) -> Self {
        self.protect = true;
        self
    }

    /// Get the full resource key (type:id)
    pub fn key(&self) -> String {
        format!("{}:{}", self.resource_type, self.id)
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn secret(&self, name: &str) -> Option<&SecretString> {
        self.secrets.get(name)
    }
}

/// Set of resources to be managed, indexed by `type:id` key.
///
/// A `BTreeMap` keeps iteration deterministic, which keeps plans
/// deterministic for a given desired state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    pub resources: BTreeMap<String, ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: ResourceConfig) {
        self.resources.insert(resource.key(), resource);
    }

    pub fn get(&self, resource_type: &str, id: &str) -> Option<&ResourceConfig> {
        self.resources.get(&format!("{resource_type}:{id}"))
    }

    pub fn get_key(&self, key: &str) -> Option<&ResourceConfig> {
        self.resources.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.values()
    }

    pub fn by_type(&self, resource_type: &str) -> Vec<&ResourceConfig> {
        self.resources
            .values()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Merge another set into this one. Keys collide last-writer-wins,
    /// which only matters if two units declare the same resource.
    pub fn merge(&mut self, other: ResourceSet) {
        self.resources.extend(other.resources);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_format() {
        let r = ResourceConfig::new("mysql-server", "prod-mysql", "azure", json!({}));
        assert_eq!(r.key(), "mysql-server:prod-mysql");
    }

    #[test]
    fn test_builder_wiring() {
        let r = ResourceConfig::new("mysql-database", "prod-db", "azure", json!({"name": "app"}))
            .with_parent("mysql-server:prod-mysql")
            .with_dependency("other:thing")
            .protected();
        assert_eq!(r.parent.as_deref(), Some("mysql-server:prod-mysql"));
        assert_eq!(r.depends_on, vec!["other:thing".to_string()]);
        assert!(r.protect);
        assert_eq!(r.get_config::<String>("name").as_deref(), Some("app"));
    }

    #[test]
    fn test_secrets_do_not_serialize_in_clear() {
        let r = ResourceConfig::new("mysql-server", "s", "azure", json!({}))
            .with_secret("password", SecretString::new("topsecret"));
        let rendered = serde_json::to_string(&r).unwrap();
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("[redacted]"));
        assert_eq!(r.secret("password").unwrap().reveal(), "topsecret");
    }

    #[test]
    fn test_set_merge_and_lookup() {
        let mut a = ResourceSet::new();
        a.add(ResourceConfig::new("storage-account", "acct", "azure", json!({})));
        let mut b = ResourceSet::new();
        b.add(ResourceConfig::new("storage-container", "logs", "azure", json!({})));
        a.merge(b);
        assert_eq!(a.len(), 2);
        assert!(a.get("storage-container", "logs").is_some());
        assert_eq!(a.by_type("storage-account").len(), 1);
    }
}
