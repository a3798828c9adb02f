//! Observed remote state
//!
//! The engine is stateless between runs: idempotence comes from reading the
//! live control plane (`CloudProvider::get_state`) and diffing the desired
//! set against what is actually there. Nothing here is persisted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Observed state of the declared resources, keyed by `type:id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderState {
    pub resources: HashMap<String, ResourceState>,
}

impl ProviderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, state: ResourceState) {
        self.resources.insert(key.into(), state);
    }

    pub fn get(&self, key: &str) -> Option<&ResourceState> {
        self.resources.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ResourceState> {
        self.resources.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResourceState)> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Observed state of a single resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Provider-side resource ID (e.g., an ARM resource id)
    pub id: String,

    /// Resource type
    pub resource_type: String,

    /// Current status
    pub status: ResourceStatus,

    /// Resource attributes (fqdn, names, provisioning details)
    pub attributes: HashMap<String, serde_json::Value>,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            status: ResourceStatus::Unknown,
            attributes: HashMap::new(),
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Status of a resource as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Resource creation is still in flight
    Creating,
    /// Resource is provisioned and usable
    Ready,
    /// Resource is being deleted
    Deleting,
    /// Provider reports the resource failed
    Failed,
    /// Status could not be determined
    Unknown,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Creating => write!(f, "creating"),
            ResourceStatus::Ready => write!(f, "ready"),
            ResourceStatus::Deleting => write!(f, "deleting"),
            ResourceStatus::Failed => write!(f, "failed"),
            ResourceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_round_trip() {
        let mut state = ResourceState::new("/subscriptions/s/x", "mysql-server")
            .with_status(ResourceStatus::Ready)
            .with_attribute("fqdn", serde_json::json!("srv.mysql.database.azure.com"));
        state.set_attribute("version", serde_json::json!("5.7"));

        assert_eq!(
            state.get_attribute::<String>("fqdn").as_deref(),
            Some("srv.mysql.database.azure.com")
        );
        assert_eq!(state.get_attribute::<String>("version").as_deref(), Some("5.7"));
        assert!(state.get_attribute::<String>("missing").is_none());
    }

    #[test]
    fn test_provider_state_lookup() {
        let mut state = ProviderState::new();
        state.add(
            "mysql-server:srv",
            ResourceState::new("id-1", "mysql-server").with_status(ResourceStatus::Ready),
        );

        assert_eq!(state.len(), 1);
        assert!(state.get("mysql-server:srv").is_some());
        assert!(state.get("mysql-server:other").is_none());
    }
}
