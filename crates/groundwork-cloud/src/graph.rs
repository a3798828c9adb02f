//! Dependency-graph ordering
//!
//! Creation order is a topological sort over the ownership tree (parent
//! before child) plus any explicit `depends_on` edges. Deletion runs the
//! same order reversed, so children are gone before their parent.

use crate::error::{CloudError, Result};
use crate::resource::{ResourceConfig, ResourceSet};
use std::collections::BTreeMap;

fn dependencies_of(resource: &ResourceConfig) -> Vec<&str> {
    let mut deps: Vec<&str> = resource.parent.as_deref().into_iter().collect();
    deps.extend(resource.depends_on.iter().map(String::as_str));
    deps
}

/// Keys of `set` in an order where every resource follows all of its
/// dependencies. Deterministic for a given set.
pub fn creation_order(set: &ResourceSet) -> Result<Vec<String>> {
    // Kahn's algorithm over BTreeMaps: ties resolve in key order.
    let mut indegree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (key, resource) in &set.resources {
        indegree.entry(key.as_str()).or_insert(0);
        for dep in dependencies_of(resource) {
            if set.get_key(dep).is_none() {
                return Err(CloudError::UnknownDependency {
                    resource: key.clone(),
                    dependency: dep.to_string(),
                });
            }
            *indegree.entry(key.as_str()).or_insert(0) += 1;
            dependents.entry(dep).or_default().push(key.as_str());
        }
    }

    let mut ready: Vec<&str> = indegree
        .iter()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(key, _)| *key)
        .collect();
    let mut order = Vec::with_capacity(set.len());

    while let Some(key) = ready.pop() {
        order.push(key.to_string());
        for dependent in dependents.remove(key).unwrap_or_default() {
            let deg = indegree
                .get_mut(dependent)
                .ok_or_else(|| CloudError::InvalidConfig(format!("unindexed key {dependent}")))?;
            *deg -= 1;
            if *deg == 0 {
                // Insert sorted so pop() keeps overall order deterministic.
                let pos = ready.binary_search(&dependent).unwrap_or_else(|p| p);
                ready.insert(pos, dependent);
            }
        }
    }

    if order.len() != set.len() {
        let stuck: Vec<&str> = indegree
            .iter()
            .filter(|&(_, &deg)| deg > 0)
            .map(|(key, _)| *key)
            .collect();
        return Err(CloudError::CircularDependency(stuck.join(", ")));
    }

    Ok(order)
}

/// Keys of `set` in safe deletion order: children before parents.
pub fn destroy_order(set: &ResourceSet) -> Result<Vec<String>> {
    let mut order = creation_order(set)?;
    order.reverse();
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(resource_type: &str, id: &str) -> ResourceConfig {
        ResourceConfig::new(resource_type, id, "azure", json!({}))
    }

    fn position(order: &[String], key: &str) -> usize {
        order.iter().position(|k| k == key).unwrap()
    }

    #[test]
    fn test_children_follow_parent() {
        let mut set = ResourceSet::new();
        set.add(resource("mysql-server", "srv"));
        set.add(resource("mysql-database", "db").with_parent("mysql-server:srv"));
        set.add(resource("mysql-vnet-rule", "rule").with_parent("mysql-server:srv"));

        let order = creation_order(&set).unwrap();
        assert_eq!(order.len(), 3);
        let server = position(&order, "mysql-server:srv");
        assert!(server < position(&order, "mysql-database:db"));
        assert!(server < position(&order, "mysql-vnet-rule:rule"));
    }

    #[test]
    fn test_explicit_dependency_honored() {
        let mut set = ResourceSet::new();
        set.add(resource("storage-account", "acct"));
        set.add(resource("storage-keys", "keys").with_dependency("storage-account:acct"));

        let order = creation_order(&set).unwrap();
        assert!(position(&order, "storage-account:acct") < position(&order, "storage-keys:keys"));
    }

    #[test]
    fn test_destroy_order_is_reversed() {
        let mut set = ResourceSet::new();
        set.add(resource("mysql-server", "srv"));
        set.add(resource("mysql-database", "db").with_parent("mysql-server:srv"));

        let order = destroy_order(&set).unwrap();
        assert!(position(&order, "mysql-database:db") < position(&order, "mysql-server:srv"));
    }

    #[test]
    fn test_cycle_detected() {
        let mut set = ResourceSet::new();
        set.add(resource("a", "1").with_dependency("b:2"));
        set.add(resource("b", "2").with_dependency("a:1"));

        match creation_order(&set) {
            Err(CloudError::CircularDependency(keys)) => {
                assert!(keys.contains("a:1"));
                assert!(keys.contains("b:2"));
            }
            other => panic!("expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let mut set = ResourceSet::new();
        set.add(resource("mysql-database", "db").with_parent("mysql-server:missing"));

        match creation_order(&set) {
            Err(CloudError::UnknownDependency { resource, dependency }) => {
                assert_eq!(resource, "mysql-database:db");
                assert_eq!(dependency, "mysql-server:missing");
            }
            other => panic!("expected UnknownDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_order_is_deterministic() {
        let mut set = ResourceSet::new();
        set.add(resource("storage-container", "b"));
        set.add(resource("storage-container", "a"));
        set.add(resource("storage-account", "acct"));

        let first = creation_order(&set).unwrap();
        let second = creation_order(&set).unwrap();
        assert_eq!(first, second);
    }
}
