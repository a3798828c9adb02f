//! Storage stack unit
//!
//! Declares the storage account and the two containers the deployment
//! service relies on, then reads the account keys once the account is
//! live.

use groundwork_cloud::{
    CloudError, OutputValue, ResourceConfig, ResourceSet, Result, StackOutputs,
};
use groundwork_cloud_azure::{AzureProvider, PROVIDER_NAME, types};
use std::collections::BTreeMap;

/// Account name is fixed: the platform's account namespace is global and
/// capped at 24 characters, so it cannot be derived from the unit name.
pub const ACCOUNT_NAME: &str = "pulumi";

/// Checkpoint data container; name is a downstream contract.
pub const CHECKPOINT_CONTAINER: &str = "pulumicheckpoints";

/// Policy-pack container; name is a downstream contract.
pub const POLICY_PACK_CONTAINER: &str = "pulumipolicypacks";

const SKU_NAME: &str = "Standard_LRS";
const ACCOUNT_KIND: &str = "StorageV2";

/// Inputs to the storage unit
#[derive(Debug, Clone, Default)]
pub struct StorageArgs {
    /// Externally provisioned resource group, by name
    pub resource_group_name: String,

    /// Tags applied to the account
    pub tags: BTreeMap<String, String>,
}

/// Storage stack unit
pub struct StorageStack {
    name: String,
    args: StorageArgs,
}

impl StorageStack {
    pub fn new(name: impl Into<String>, args: StorageArgs) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn account_key(&self) -> String {
        format!("{}:{}", types::STORAGE_ACCOUNT, ACCOUNT_NAME)
    }

    /// Desired state: one account and two containers. Everything is
    /// protected; checkpoints and policy packs must survive careless
    /// updates.
    pub fn resources(&self) -> ResourceSet {
        let mut set = ResourceSet::new();
        let account_key = self.account_key();

        set.add(
            ResourceConfig::new(
                types::STORAGE_ACCOUNT,
                ACCOUNT_NAME,
                PROVIDER_NAME,
                serde_json::json!({
                    "name": ACCOUNT_NAME,
                    "sku_name": SKU_NAME,
                    "kind": ACCOUNT_KIND,
                    "tags": &self.args.tags,
                }),
            )
            .protected(),
        );

        for container in [CHECKPOINT_CONTAINER, POLICY_PACK_CONTAINER] {
            set.add(
                ResourceConfig::new(
                    types::STORAGE_CONTAINER,
                    container,
                    PROVIDER_NAME,
                    serde_json::json!({
                        "account_name": ACCOUNT_NAME,
                        "name": container,
                    }),
                )
                .with_parent(&account_key)
                .protected(),
            );
        }

        set
    }

    /// Resolve the unit's published outputs, including both access keys.
    ///
    /// The key read is sequenced after account creation by construction:
    /// it fails with `ResourceNotFound` until the account is provisioned.
    pub async fn outputs(&self, provider: &AzureProvider) -> Result<StackOutputs> {
        let rg = &self.args.resource_group_name;
        tracing::debug!(unit = %self.name, account = ACCOUNT_NAME, "resolving storage outputs");
        let cli = provider.cli();

        let account = cli
            .get_storage_account(rg, ACCOUNT_NAME)
            .await
            .map_err(CloudError::from)?
            .ok_or_else(|| {
                CloudError::ResourceNotFound(format!(
                    "storage account {ACCOUNT_NAME} is not provisioned"
                ))
            })?;

        let (key1, key2) = provider
            .storage_account_keys(ACCOUNT_NAME)
            .await
            .map_err(CloudError::from)?;

        let mut outputs = StackOutputs::new(self.name.clone());
        outputs.set("account_id", OutputValue::plain(account.id));
        outputs.set("account_name", OutputValue::plain(account.name));
        outputs.set("primary_key", OutputValue::secret(key1));
        outputs.set("secondary_key", OutputValue::secret(key2));

        for (container, id_output, name_output) in [
            (CHECKPOINT_CONTAINER, "checkpoint_container_id", "checkpoint_container_name"),
            (POLICY_PACK_CONTAINER, "policy_container_id", "policy_container_name"),
        ] {
            let info = cli
                .get_container(rg, ACCOUNT_NAME, container)
                .await
                .map_err(CloudError::from)?
                .ok_or_else(|| {
                    CloudError::ResourceNotFound(format!("container {container} is not provisioned"))
                })?;
            outputs.set(id_output, OutputValue::plain(info.id));
            outputs.set(name_output, OutputValue::plain(info.name));
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundwork_cloud::{creation_order, destroy_plan};

    fn stack() -> StorageStack {
        StorageStack::new(
            "selfhosted-storage",
            StorageArgs {
                resource_group_name: "rg-test".to_string(),
                tags: BTreeMap::new(),
            },
        )
    }

    #[test]
    fn test_declares_one_account_and_two_containers() {
        let set = stack().resources();
        assert_eq!(set.len(), 3);
        assert_eq!(set.by_type(types::STORAGE_ACCOUNT).len(), 1);
        assert_eq!(set.by_type(types::STORAGE_CONTAINER).len(), 2);
    }

    #[test]
    fn test_container_names_are_fixed_contracts() {
        let set = stack().resources();
        let mut names: Vec<String> = set
            .by_type(types::STORAGE_CONTAINER)
            .iter()
            .filter_map(|c| c.get_config::<String>("name"))
            .collect();
        names.sort();
        assert_eq!(names, vec!["pulumicheckpoints", "pulumipolicypacks"]);
    }

    #[test]
    fn test_account_name_is_fixed() {
        let set = stack().resources();
        let account = &set.by_type(types::STORAGE_ACCOUNT)[0];
        assert_eq!(account.get_config::<String>("name").as_deref(), Some("pulumi"));
        assert_eq!(account.get_config::<String>("sku_name").as_deref(), Some("Standard_LRS"));
        assert_eq!(account.get_config::<String>("kind").as_deref(), Some("StorageV2"));
    }

    #[test]
    fn test_containers_are_children_of_account() {
        let set = stack().resources();
        let account_key = format!("{}:{}", types::STORAGE_ACCOUNT, ACCOUNT_NAME);
        for container in set.by_type(types::STORAGE_CONTAINER) {
            assert_eq!(container.parent.as_deref(), Some(account_key.as_str()));
        }

        let order = creation_order(&set).unwrap();
        assert_eq!(order[0], account_key);
    }

    #[test]
    fn test_everything_is_protected() {
        let set = stack().resources();
        assert!(set.iter().all(|r| r.protect));
    }

    #[test]
    fn test_destroy_fails_closed_without_force() {
        let set = stack().resources();
        assert!(matches!(
            destroy_plan(&set, false),
            Err(CloudError::ProtectedResource(_))
        ));

        // With force, containers go before the account.
        let plan = destroy_plan(&set, true).unwrap();
        let account_position = plan
            .actions
            .iter()
            .position(|a| a.resource_type == types::STORAGE_ACCOUNT)
            .unwrap();
        assert_eq!(account_position, plan.actions.len() - 1);
    }
}
