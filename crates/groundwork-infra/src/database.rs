//! Database stack unit
//!
//! Declares a managed MySQL server and its children. The admin password is
//! generated fresh per construction unless pinned through
//! [`DatabaseArgs::password`], so an unpinned re-provisioning run rotates
//! the credential.

use groundwork_cloud::{
    CloudError, OutputValue, PasswordPolicy, ResourceConfig, ResourceSet, Result, SecretString,
    StackOutputs,
};
use groundwork_cloud_azure::provider::ADMIN_PASSWORD_SECRET;
use groundwork_cloud_azure::{AzureProvider, PROVIDER_NAME, types};
use std::collections::BTreeMap;

/// The deployment service connects to this exact database name.
pub const DATABASE_NAME: &str = "pulumi";

pub const ADMIN_LOGIN: &str = "pulumiadmin";
pub const MYSQL_VERSION: &str = "5.7";
pub const SKU_NAME: &str = "GP_Gen5_4";

/// Server parameter required to create functions without SUPER privilege
/// (MySQL error 1419 otherwise).
pub const TRUST_FUNCTION_CREATORS: (&str, &str) = ("log_bin_trust_function_creators", "ON");

const STORAGE_MB: u32 = 51200;
const BACKUP_RETENTION_DAYS: u32 = 7;

/// Inputs to the database unit
#[derive(Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// Externally provisioned resource group, by name
    pub resource_group_name: String,

    /// Subnet the server is reachable from
    pub subnet_id: String,

    /// Tags applied to the server
    pub tags: BTreeMap<String, String>,

    /// Pin the admin password across runs. `None` generates a fresh
    /// credential per construction.
    pub password: Option<SecretString>,
}

/// Database stack unit
pub struct DatabaseStack {
    name: String,
    args: DatabaseArgs,
    password: SecretString,
}

impl DatabaseStack {
    pub fn new(name: impl Into<String>, args: DatabaseArgs) -> Result<Self> {
        let password = match &args.password {
            Some(pinned) => pinned.clone(),
            None => PasswordPolicy::default().generate()?,
        };
        Ok(Self {
            name: name.into(),
            args,
            password,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cloud-side server name, derived from the unit's logical name
    pub fn server_name(&self) -> String {
        format!("{}-mysql", self.name)
    }

    fn server_key(&self) -> String {
        format!("{}:{}", types::MYSQL_SERVER, self.server_name())
    }

    /// Desired state: one server, one configuration override, one vnet
    /// rule, one database. Children hang off the server so they are
    /// ordered after it and torn down before it.
    pub fn resources(&self) -> ResourceSet {
        let mut set = ResourceSet::new();
        let server_name = self.server_name();
        let server_key = self.server_key();

        set.add(
            ResourceConfig::new(
                types::MYSQL_SERVER,
                server_name.clone(),
                PROVIDER_NAME,
                serde_json::json!({
                    "name": &server_name,
                    "administrator_login": ADMIN_LOGIN,
                    "version": MYSQL_VERSION,
                    "sku_name": SKU_NAME,
                    "storage_mb": STORAGE_MB,
                    "backup_retention_days": BACKUP_RETENTION_DAYS,
                    "geo_redundant_backup": "Disabled",
                    "auto_grow": "Enabled",
                    "infrastructure_encryption": "Disabled",
                    "public_network_access": "Enabled",
                    // Inherited policy: transport security stays relaxed.
                    // The provider warns at plan time instead of hardening.
                    "ssl_enforcement": "Disabled",
                    "minimal_tls_version": "TLSEnforcementDisabled",
                    "tags": &self.args.tags,
                }),
            )
            .with_secret(ADMIN_PASSWORD_SECRET, self.password.clone())
            .protected(),
        );

        set.add(
            ResourceConfig::new(
                types::MYSQL_CONFIGURATION,
                format!("{}-config", self.name),
                PROVIDER_NAME,
                serde_json::json!({
                    "server_name": &server_name,
                    "name": TRUST_FUNCTION_CREATORS.0,
                    "value": TRUST_FUNCTION_CREATORS.1,
                    "source": "user-override",
                }),
            )
            .with_parent(&server_key),
        );

        set.add(
            ResourceConfig::new(
                types::MYSQL_VNET_RULE,
                format!("{}-dbvnetrule", self.name),
                PROVIDER_NAME,
                serde_json::json!({
                    "server_name": &server_name,
                    "name": format!("{}-dbvnetrule", self.name),
                    "subnet_id": &self.args.subnet_id,
                }),
            )
            .with_parent(&server_key),
        );

        set.add(
            ResourceConfig::new(
                types::MYSQL_DATABASE,
                server_name.clone(),
                PROVIDER_NAME,
                serde_json::json!({
                    "server_name": &server_name,
                    "name": DATABASE_NAME,
                }),
            )
            .with_parent(&server_key)
            .protected(),
        );

        set
    }

    /// Resolve the unit's published outputs from the live server.
    /// Valid only after the resources have been applied.
    pub async fn outputs(&self, provider: &AzureProvider) -> Result<StackOutputs> {
        let server_name = self.server_name();
        tracing::debug!(unit = %self.name, server = %server_name, "resolving database outputs");
        let server = provider
            .cli()
            .get_mysql_server(&self.args.resource_group_name, &server_name)
            .await
            .map_err(CloudError::from)?
            .ok_or_else(|| {
                CloudError::ResourceNotFound(format!("mysql server {server_name} is not provisioned"))
            })?;

        let mut outputs = StackOutputs::new(self.name.clone());
        outputs.set(
            "host",
            OutputValue::plain(server.fully_qualified_domain_name.unwrap_or_default()),
        );
        outputs.set(
            "login",
            OutputValue::plain(
                server
                    .administrator_login
                    .unwrap_or_else(|| ADMIN_LOGIN.to_string()),
            ),
        );
        outputs.set("password", OutputValue::secret(self.password.clone()));
        outputs.set("database_name", OutputValue::plain(DATABASE_NAME));
        outputs.set("server_name", OutputValue::plain(server.name));
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundwork_cloud::{ActionType, creation_order, destroy_plan};

    fn args() -> DatabaseArgs {
        DatabaseArgs {
            resource_group_name: "rg-test".to_string(),
            subnet_id: "/subnets/app-subnet".to_string(),
            ..DatabaseArgs::default()
        }
    }

    fn stack() -> DatabaseStack {
        DatabaseStack::new("selfhosted-database", args()).unwrap()
    }

    #[test]
    fn test_declares_exactly_four_resources() {
        let set = stack().resources();
        assert_eq!(set.len(), 4);
        assert_eq!(set.by_type(types::MYSQL_SERVER).len(), 1);
        assert_eq!(set.by_type(types::MYSQL_CONFIGURATION).len(), 1);
        assert_eq!(set.by_type(types::MYSQL_VNET_RULE).len(), 1);
        assert_eq!(set.by_type(types::MYSQL_DATABASE).len(), 1);
    }

    #[test]
    fn test_server_name_follows_unit_name() {
        let stack = stack();
        assert_eq!(stack.server_name(), "selfhosted-database-mysql");
        let set = stack.resources();
        assert!(set.get(types::MYSQL_SERVER, "selfhosted-database-mysql").is_some());
    }

    #[test]
    fn test_database_name_is_fixed_contract() {
        let set = stack().resources();
        let db = &set.by_type(types::MYSQL_DATABASE)[0];
        assert_eq!(db.get_config::<String>("name").as_deref(), Some("pulumi"));
    }

    #[test]
    fn test_configuration_override_pair() {
        let set = stack().resources();
        let config = &set.by_type(types::MYSQL_CONFIGURATION)[0];
        assert_eq!(
            config.get_config::<String>("name").as_deref(),
            Some("log_bin_trust_function_creators")
        );
        assert_eq!(config.get_config::<String>("value").as_deref(), Some("ON"));
        assert_eq!(
            config.get_config::<String>("source").as_deref(),
            Some("user-override")
        );
    }

    #[test]
    fn test_children_hang_off_server() {
        let stack = stack();
        let server_key = format!("{}:{}", types::MYSQL_SERVER, stack.server_name());
        let set = stack.resources();
        for resource in set.iter() {
            if resource.resource_type == types::MYSQL_SERVER {
                assert!(resource.parent.is_none());
            } else {
                assert_eq!(resource.parent.as_deref(), Some(server_key.as_str()));
            }
        }

        let order = creation_order(&set).unwrap();
        assert_eq!(order[0], server_key);
    }

    #[test]
    fn test_vnet_rule_binds_supplied_subnet() {
        let set = stack().resources();
        let rule = &set.by_type(types::MYSQL_VNET_RULE)[0];
        assert_eq!(
            rule.get_config::<String>("subnet_id").as_deref(),
            Some("/subnets/app-subnet")
        );
    }

    #[test]
    fn test_server_and_database_are_protected() {
        let set = stack().resources();
        assert!(set.by_type(types::MYSQL_SERVER)[0].protect);
        assert!(set.by_type(types::MYSQL_DATABASE)[0].protect);
        assert!(!set.by_type(types::MYSQL_CONFIGURATION)[0].protect);
        assert!(!set.by_type(types::MYSQL_VNET_RULE)[0].protect);
    }

    #[test]
    fn test_destroy_fails_closed_without_force() {
        let set = stack().resources();
        assert!(matches!(
            destroy_plan(&set, false),
            Err(CloudError::ProtectedResource(_))
        ));

        let plan = destroy_plan(&set, true).unwrap();
        assert_eq!(plan.actions.len(), 4);
        assert!(plan.actions.iter().all(|a| a.action_type == ActionType::Delete));
    }

    #[test]
    fn test_unchanged_environment_diffs_to_noops() {
        use groundwork_cloud::{ResourceState, ResourceStatus};
        use groundwork_cloud_azure::provider::diff_resource;

        let stack = stack();
        let set = stack.resources();

        // Mirror every declared resource as already provisioned.
        let mut observed = std::collections::HashMap::new();
        for resource in set.iter() {
            let mut state = ResourceState::new(format!("/live/{}", resource.key()), resource.resource_type.clone())
                .with_status(ResourceStatus::Ready);
            if let Some(config) = resource.config.as_object() {
                for (key, value) in config {
                    state.set_attribute(key.clone(), value.clone());
                }
            }
            observed.insert(resource.key(), state);
        }

        for key in creation_order(&set).unwrap() {
            let resource = set.get_key(&key).unwrap();
            let action = diff_resource(resource, observed.get(&key)).unwrap();
            assert_eq!(action.action_type, ActionType::NoOp, "{key} should be unchanged");
        }
    }

    #[test]
    fn test_password_policy_and_rotation() {
        let first = DatabaseStack::new("u", args()).unwrap();
        let second = DatabaseStack::new("u", args()).unwrap();

        let password = first.password.reveal();
        assert_eq!(password.len(), 20);
        assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        assert!(password.chars().any(|c| c.is_ascii_uppercase()));
        assert!(password.chars().any(|c| !c.is_ascii_alphanumeric()));

        // Unpinned construction rotates.
        assert_ne!(first.password.reveal(), second.password.reveal());
    }

    #[test]
    fn test_pinned_password_is_kept() {
        let pinned = SecretString::new("Pinned#Secret$12345X");
        let stack = DatabaseStack::new(
            "u",
            DatabaseArgs {
                password: Some(pinned.clone()),
                ..args()
            },
        )
        .unwrap();

        let set = stack.resources();
        let server = &set.by_type(types::MYSQL_SERVER)[0];
        assert_eq!(
            server.secret(ADMIN_PASSWORD_SECRET).unwrap().reveal(),
            pinned.reveal()
        );
    }

    #[test]
    fn test_password_never_serializes_in_clear() {
        let stack = stack();
        let rendered = serde_json::to_string(&stack.resources()).unwrap();
        assert!(!rendered.contains(stack.password.reveal()));
    }
}
