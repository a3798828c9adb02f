//! Azure provider implementation
//!
//! Desired state is diffed against the live control plane on every plan;
//! no local state is kept between runs. Apply walks the plan in dependency
//! order and refuses to act on anything whose dependency already failed.

use crate::azcli::{
    AzCli, MysqlConfigurationConfig, MysqlDatabaseConfig, MysqlServerConfig, MysqlServerInfo,
    MysqlVnetRuleConfig, StorageAccountConfig, StorageAccountInfo, StorageContainerConfig,
};
use crate::error::{AzureError, Result};
use async_trait::async_trait;
use groundwork_cloud::{
    Action, ActionType, ApplyResult, AuthStatus, CloudError, CloudProvider, Plan, ProviderState,
    ResourceConfig, ResourceSet, ResourceState, ResourceStatus, SecretString, creation_order,
};
use std::collections::HashSet;

/// Resource types managed by this provider.
pub mod types {
    pub const MYSQL_SERVER: &str = "mysql-server";
    pub const MYSQL_CONFIGURATION: &str = "mysql-configuration";
    pub const MYSQL_VNET_RULE: &str = "mysql-vnet-rule";
    pub const MYSQL_DATABASE: &str = "mysql-database";
    pub const STORAGE_ACCOUNT: &str = "storage-account";
    pub const STORAGE_CONTAINER: &str = "storage-container";
}

/// Secret slot name for the MySQL admin password on a `mysql-server`
/// descriptor.
pub const ADMIN_PASSWORD_SECRET: &str = "administrator_login_password";

/// Azure provider scoped to one resource group.
///
/// The resource group itself is an externally supplied handle; it is never
/// created or deleted here.
pub struct AzureProvider {
    az: AzCli,
    resource_group: String,
}

impl AzureProvider {
    pub fn new(resource_group: impl Into<String>) -> Self {
        Self {
            az: AzCli::new(),
            resource_group: resource_group.into(),
        }
    }

    pub fn with_cli(az: AzCli, resource_group: impl Into<String>) -> Self {
        Self {
            az,
            resource_group: resource_group.into(),
        }
    }

    pub fn cli(&self) -> &AzCli {
        &self.az
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    /// Read both access keys of a storage account.
    ///
    /// Fails unless the account is already provisioned, so a caller cannot
    /// race key retrieval against account creation.
    pub async fn storage_account_keys(
        &self,
        account_name: &str,
    ) -> Result<(SecretString, SecretString)> {
        let account = self
            .az
            .get_storage_account(&self.resource_group, account_name)
            .await?
            .ok_or_else(|| {
                AzureError::ResourceNotFound(format!(
                    "storage account {account_name} is not provisioned yet"
                ))
            })?;
        if !account.is_ready() {
            return Err(AzureError::ResourceNotFound(format!(
                "storage account {account_name} is still provisioning"
            )));
        }

        let keys = self
            .az
            .list_storage_account_keys(&self.resource_group, account_name)
            .await?;
        let find = |name: &str| {
            keys.iter()
                .find(|k| k.key_name == name)
                .map(|k| k.value.clone())
                .ok_or_else(|| {
                    AzureError::ResourceNotFound(format!(
                        "storage account {account_name} has no key named {name}"
                    ))
                })
        };
        Ok((find("key1")?, find("key2")?))
    }

    async fn observe(&self, resource: &ResourceConfig) -> Result<Option<ResourceState>> {
        let rg = &self.resource_group;
        let state = match resource.resource_type.as_str() {
            types::MYSQL_SERVER => {
                let name = required_config(resource, "name")?;
                self.az
                    .get_mysql_server(rg, &name)
                    .await?
                    .map(|info| server_state(&info))
            }
            types::MYSQL_CONFIGURATION => {
                let server = required_config(resource, "server_name")?;
                let name = required_config(resource, "name")?;
                self.az
                    .get_mysql_configuration(rg, &server, &name)
                    .await?
                    .map(|info| {
                        ResourceState::new(info.id, types::MYSQL_CONFIGURATION)
                            .with_status(ResourceStatus::Ready)
                            .with_attribute("name", serde_json::json!(info.name))
                            .with_attribute("value", serde_json::json!(info.value))
                            .with_attribute("source", serde_json::json!(info.source))
                    })
            }
            types::MYSQL_VNET_RULE => {
                let server = required_config(resource, "server_name")?;
                let name = required_config(resource, "name")?;
                self.az
                    .get_mysql_vnet_rule(rg, &server, &name)
                    .await?
                    .map(|info| {
                        let status = match info.state.as_deref() {
                            Some("InProgress") | Some("Initializing") => ResourceStatus::Creating,
                            Some("Ready") => ResourceStatus::Ready,
                            _ => ResourceStatus::Unknown,
                        };
                        ResourceState::new(info.id, types::MYSQL_VNET_RULE)
                            .with_status(status)
                            .with_attribute("name", serde_json::json!(info.name))
                            .with_attribute(
                                "subnet_id",
                                serde_json::json!(info.virtual_network_subnet_id),
                            )
                    })
            }
            types::MYSQL_DATABASE => {
                let server = required_config(resource, "server_name")?;
                let name = required_config(resource, "name")?;
                self.az
                    .get_mysql_database(rg, &server, &name)
                    .await?
                    .map(|info| {
                        ResourceState::new(info.id, types::MYSQL_DATABASE)
                            .with_status(ResourceStatus::Ready)
                            .with_attribute("name", serde_json::json!(info.name))
                            .with_attribute("charset", serde_json::json!(info.charset))
                    })
            }
            types::STORAGE_ACCOUNT => {
                let name = required_config(resource, "name")?;
                self.az
                    .get_storage_account(rg, &name)
                    .await?
                    .map(|info| account_state(&info))
            }
            types::STORAGE_CONTAINER => {
                let account = required_config(resource, "account_name")?;
                let name = required_config(resource, "name")?;
                self.az
                    .get_container(rg, &account, &name)
                    .await?
                    .map(|info| {
                        ResourceState::new(info.id, types::STORAGE_CONTAINER)
                            .with_status(ResourceStatus::Ready)
                            .with_attribute("name", serde_json::json!(info.name))
                    })
            }
            other => {
                return Err(AzureError::InvalidConfig(format!(
                    "unsupported resource type: {other}"
                )));
            }
        };
        Ok(state)
    }

    async fn execute_action(
        &self,
        action: &Action,
        resource: &ResourceConfig,
    ) -> Result<String> {
        let rg = &self.resource_group;
        match (action.action_type, resource.resource_type.as_str()) {
            (ActionType::Create, types::MYSQL_SERVER) => {
                let config: MysqlServerConfig = parse_config(resource)?;
                let password = resource.secret(ADMIN_PASSWORD_SECRET).ok_or_else(|| {
                    AzureError::InvalidConfig(format!(
                        "{} has no {ADMIN_PASSWORD_SECRET} secret",
                        resource.key()
                    ))
                })?;
                let info = self.az.create_mysql_server(rg, &config, password).await?;
                Ok(format!("created mysql server {} ({})", info.name, info.id))
            }
            (ActionType::Update, types::MYSQL_SERVER) => {
                let config: MysqlServerConfig = parse_config(resource)?;
                let info = self.az.update_mysql_server(rg, &config).await?;
                Ok(format!("updated mysql server {}", info.name))
            }
            (ActionType::Delete, types::MYSQL_SERVER) => {
                let name = required_config(resource, "name")?;
                self.az.delete_mysql_server(rg, &name).await?;
                Ok(format!("deleted mysql server {name}"))
            }
            (ActionType::Create | ActionType::Update, types::MYSQL_CONFIGURATION) => {
                let config: MysqlConfigurationConfig = parse_config(resource)?;
                let info = self.az.set_mysql_configuration(rg, &config).await?;
                Ok(format!(
                    "set {} = {} on {}",
                    info.name,
                    info.value.as_deref().unwrap_or_default(),
                    config.server_name
                ))
            }
            (ActionType::Delete, types::MYSQL_CONFIGURATION) => {
                // Server parameters are not deletable objects; resetting to
                // the engine default is the closest equivalent and happens
                // implicitly when the server goes away.
                Ok(format!("left {} to server defaults", action.resource_key))
            }
            (ActionType::Create | ActionType::Update, types::MYSQL_VNET_RULE) => {
                let config: MysqlVnetRuleConfig = parse_config(resource)?;
                let info = self.az.create_mysql_vnet_rule(rg, &config).await?;
                Ok(format!("bound {} to {}", config.server_name, info.name))
            }
            (ActionType::Delete, types::MYSQL_VNET_RULE) => {
                let server = required_config(resource, "server_name")?;
                let name = required_config(resource, "name")?;
                self.az.delete_mysql_vnet_rule(rg, &server, &name).await?;
                Ok(format!("deleted vnet rule {name}"))
            }
            (ActionType::Create, types::MYSQL_DATABASE) => {
                let config: MysqlDatabaseConfig = parse_config(resource)?;
                let info = self.az.create_mysql_database(rg, &config).await?;
                Ok(format!("created database {} ({})", info.name, info.id))
            }
            (ActionType::Delete, types::MYSQL_DATABASE) => {
                let server = required_config(resource, "server_name")?;
                let name = required_config(resource, "name")?;
                self.az.delete_mysql_database(rg, &server, &name).await?;
                Ok(format!("deleted database {name}"))
            }
            (ActionType::Create, types::STORAGE_ACCOUNT) => {
                let config: StorageAccountConfig = parse_config(resource)?;
                let info = self.az.create_storage_account(rg, &config).await?;
                Ok(format!("created storage account {} ({})", info.name, info.id))
            }
            (ActionType::Update, types::STORAGE_ACCOUNT) => {
                let config: StorageAccountConfig = parse_config(resource)?;
                let info = self.az.update_storage_account(rg, &config).await?;
                Ok(format!("updated storage account {}", info.name))
            }
            (ActionType::Delete, types::STORAGE_ACCOUNT) => {
                let name = required_config(resource, "name")?;
                self.az.delete_storage_account(rg, &name).await?;
                Ok(format!("deleted storage account {name}"))
            }
            (ActionType::Create, types::STORAGE_CONTAINER) => {
                let config: StorageContainerConfig = parse_config(resource)?;
                let info = self.az.create_container(rg, &config).await?;
                Ok(format!("created container {} ({})", info.name, info.id))
            }
            (ActionType::Delete, types::STORAGE_CONTAINER) => {
                let account = required_config(resource, "account_name")?;
                let name = required_config(resource, "name")?;
                self.az.delete_container(rg, &account, &name).await?;
                Ok(format!("deleted container {name}"))
            }
            (action_type, resource_type) => Err(AzureError::InvalidConfig(format!(
                "no {action_type} handler for {resource_type}"
            ))),
        }
    }
}

#[async_trait]
impl CloudProvider for AzureProvider {
    fn name(&self) -> &str {
        "azure"
    }

    fn display_name(&self) -> &str {
        "Microsoft Azure"
    }

    async fn check_auth(&self) -> groundwork_cloud::Result<AuthStatus> {
        match self.az.check_auth().await {
            Ok(account) => {
                let user = account
                    .user
                    .map(|u| u.name)
                    .unwrap_or_else(|| "unknown user".to_string());
                Ok(AuthStatus::ok(format!("{} ({})", user, account.name)))
            }
            Err(AzureError::AzNotFound) => Ok(AuthStatus::failed(AzureError::AzNotFound.to_string())),
            Err(AzureError::AuthenticationFailed(msg)) => Ok(AuthStatus::failed(msg)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_state(&self, desired: &ResourceSet) -> groundwork_cloud::Result<ProviderState> {
        let mut state = ProviderState::new();
        for resource in desired.iter() {
            if let Some(observed) = self.observe(resource).await.map_err(CloudError::from)? {
                state.add(resource.key(), observed);
            }
        }
        Ok(state)
    }

    async fn plan(&self, desired: &ResourceSet) -> groundwork_cloud::Result<Plan> {
        // Order first: an invalid graph is a configuration error and
        // should fail before any remote call is made.
        let order = creation_order(desired)?;
        let current = self.get_state(desired).await?;

        let mut actions = Vec::with_capacity(order.len());
        for key in &order {
            let resource = &desired.resources[key];

            if resource.resource_type == types::MYSQL_SERVER {
                for setting in relaxed_tls_settings(resource) {
                    tracing::warn!(
                        resource = %key,
                        setting,
                        "transport security is relaxed by design; confirm this is intended"
                    );
                }
            }

            actions.push(diff_resource(resource, current.get(key))?);
        }

        Ok(Plan::new(actions))
    }

    async fn apply(
        &self,
        desired: &ResourceSet,
        plan: &Plan,
    ) -> groundwork_cloud::Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let mut failed_keys: HashSet<String> = HashSet::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            if action.action_type == ActionType::NoOp {
                continue;
            }

            let resource = desired.get_key(&action.resource_key).ok_or_else(|| {
                CloudError::ResourceNotFound(action.resource_key.clone())
            })?;

            if let Some(blocker) = blocking_failure(desired, action, &failed_keys) {
                tracing::warn!(
                    action = %action.id,
                    blocker = %blocker,
                    "skipping action because a dependency failed"
                );
                result.add_skipped(
                    action.id.clone(),
                    format!("skipped: dependency {blocker} failed"),
                );
                failed_keys.insert(action.resource_key.clone());
                continue;
            }

            tracing::info!(action = %action.id, "{}", action.description);
            match self.execute_action(action, resource).await {
                Ok(message) => result.add_success(action.id.clone(), message),
                Err(e) => {
                    tracing::error!(action = %action.id, error = %e, "action failed");
                    result.add_failure(action.id.clone(), e.to_string());
                    failed_keys.insert(action.resource_key.clone());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }
}

fn parse_config<T: serde::de::DeserializeOwned>(resource: &ResourceConfig) -> Result<T> {
    serde_json::from_value(resource.config.clone()).map_err(|e| {
        AzureError::InvalidConfig(format!("{}: {e}", resource.key()))
    })
}

fn required_config(resource: &ResourceConfig, key: &str) -> Result<String> {
    resource.get_config::<String>(key).ok_or_else(|| {
        AzureError::InvalidConfig(format!("{} is missing config key {key}", resource.key()))
    })
}

fn server_state(info: &MysqlServerInfo) -> ResourceState {
    let status = match info.user_visible_state.as_deref() {
        Some("Ready") => ResourceStatus::Ready,
        Some("Dropping") => ResourceStatus::Deleting,
        Some("Inaccessible") | Some("Disabled") => ResourceStatus::Failed,
        _ => ResourceStatus::Unknown,
    };
    let mut state = ResourceState::new(&info.id, types::MYSQL_SERVER)
        .with_status(status)
        .with_attribute("name", serde_json::json!(info.name))
        .with_attribute("fqdn", serde_json::json!(info.fully_qualified_domain_name))
        .with_attribute(
            "administrator_login",
            serde_json::json!(info.administrator_login),
        )
        .with_attribute("version", serde_json::json!(info.version))
        .with_attribute("ssl_enforcement", serde_json::json!(info.ssl_enforcement))
        .with_attribute(
            "minimal_tls_version",
            serde_json::json!(info.minimal_tls_version),
        );
    if let Some(sku) = &info.sku {
        state.set_attribute("sku_name", serde_json::json!(sku.name));
    }
    if let Some(profile) = &info.storage_profile {
        state.set_attribute("storage_mb", serde_json::json!(profile.storage_mb));
        state.set_attribute(
            "backup_retention_days",
            serde_json::json!(profile.backup_retention_days),
        );
        state.set_attribute(
            "geo_redundant_backup",
            serde_json::json!(profile.geo_redundant_backup),
        );
        state.set_attribute("auto_grow", serde_json::json!(profile.storage_autogrow));
    }
    if let Some(tags) = &info.tags {
        state.set_attribute("tags", serde_json::json!(tags));
    }
    state
}

fn account_state(info: &StorageAccountInfo) -> ResourceState {
    let status = match info.provisioning_state.as_deref() {
        Some("Succeeded") => ResourceStatus::Ready,
        Some("Creating") | Some("ResolvingDns") => ResourceStatus::Creating,
        _ => ResourceStatus::Unknown,
    };
    let mut state = ResourceState::new(&info.id, types::STORAGE_ACCOUNT)
        .with_status(status)
        .with_attribute("name", serde_json::json!(info.name))
        .with_attribute("kind", serde_json::json!(info.kind));
    if let Some(sku) = &info.sku {
        state.set_attribute("sku_name", serde_json::json!(sku.name));
    }
    if let Some(tags) = &info.tags {
        state.set_attribute("tags", serde_json::json!(tags));
    }
    state
}

/// Fields that can only be set at creation time, per resource type.
/// Drift in one of these cannot be applied in place.
fn immutable_fields(resource_type: &str) -> &'static [&'static str] {
    match resource_type {
        types::MYSQL_SERVER => &["name", "administrator_login", "version", "sku_name"],
        types::MYSQL_DATABASE => &["name", "server_name"],
        types::STORAGE_ACCOUNT => &["name", "kind"],
        types::STORAGE_CONTAINER => &["name", "account_name"],
        // Configuration overrides and vnet rules are pure upserts.
        _ => &[],
    }
}

/// Difference between a desired descriptor and its observed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    None,
    /// Fields that can be changed in place
    Update(Vec<String>),
    /// Fields that would force destroy-and-recreate
    Replace(Vec<String>),
}

/// Compare the desired configuration against observed attributes.
///
/// Only keys present on both sides participate: the provider not
/// reporting a field is not drift.
pub fn classify_drift(desired: &ResourceConfig, current: &ResourceState) -> Drift {
    let Some(config) = desired.config.as_object() else {
        return Drift::None;
    };
    let immutable = immutable_fields(&desired.resource_type);

    let mut mutable_changed = Vec::new();
    let mut immutable_changed = Vec::new();
    for (key, desired_value) in config {
        let Some(current_value) = current.attributes.get(key) else {
            continue;
        };
        if current_value.is_null() || desired_value == current_value {
            continue;
        }
        if immutable.contains(&key.as_str()) {
            immutable_changed.push(key.clone());
        } else {
            mutable_changed.push(key.clone());
        }
    }

    if !immutable_changed.is_empty() {
        Drift::Replace(immutable_changed)
    } else if !mutable_changed.is_empty() {
        Drift::Update(mutable_changed)
    } else {
        Drift::None
    }
}

/// Decide the plan action for one resource.
///
/// Replacement is never planned implicitly: a protected resource fails
/// closed, an unprotected one still requires an explicit destroy first.
pub fn diff_resource(
    desired: &ResourceConfig,
    current: Option<&ResourceState>,
) -> groundwork_cloud::Result<Action> {
    let key = desired.key();
    let Some(current) = current else {
        return Ok(Action::new(
            ActionType::Create,
            desired.resource_type.clone(),
            desired.id.clone(),
            format!("create {key}"),
        )
        .with_detail("provider", serde_json::json!("azure")));
    };

    match classify_drift(desired, current) {
        Drift::None => Ok(Action::new(
            ActionType::NoOp,
            desired.resource_type.clone(),
            desired.id.clone(),
            format!("{key} is up to date"),
        )),
        Drift::Update(fields) => Ok(Action::new(
            ActionType::Update,
            desired.resource_type.clone(),
            desired.id.clone(),
            format!("update {key} ({})", fields.join(", ")),
        )
        .with_detail("fields", serde_json::json!(fields))),
        Drift::Replace(fields) => {
            if desired.protect {
                Err(CloudError::ProtectedResource(key))
            } else {
                Err(CloudError::InvalidConfig(format!(
                    "{key}: {} can only be set at creation; destroy and re-create explicitly",
                    fields.join(", ")
                )))
            }
        }
    }
}

/// TLS-related settings of a server descriptor that are relaxed.
pub fn relaxed_tls_settings(resource: &ResourceConfig) -> Vec<&'static str> {
    let mut relaxed = Vec::new();
    if resource.get_config::<String>("ssl_enforcement").as_deref() == Some("Disabled") {
        relaxed.push("ssl_enforcement=Disabled");
    }
    if resource.get_config::<String>("minimal_tls_version").as_deref()
        == Some("TLSEnforcementDisabled")
    {
        relaxed.push("minimal_tls_version=TLSEnforcementDisabled");
    }
    relaxed
}

/// The dependency (or dependent, for deletes) of `action` that already
/// failed, if any.
fn blocking_failure(
    desired: &ResourceSet,
    action: &Action,
    failed: &HashSet<String>,
) -> Option<String> {
    let resource = desired.get_key(&action.resource_key)?;
    match action.action_type {
        ActionType::Create | ActionType::Update => resource
            .parent
            .iter()
            .chain(resource.depends_on.iter())
            .find(|dep| failed.contains(*dep))
            .cloned(),
        ActionType::Delete => desired
            .iter()
            .filter(|r| {
                r.parent.as_deref() == Some(action.resource_key.as_str())
                    || r.depends_on.iter().any(|d| d == &action.resource_key)
            })
            .map(|r| r.key())
            .find(|key| failed.contains(key)),
        ActionType::NoOp => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server_config() -> ResourceConfig {
        ResourceConfig::new(
            types::MYSQL_SERVER,
            "prod-mysql",
            "azure",
            json!({
                "name": "prod-mysql",
                "administrator_login": "pulumiadmin",
                "version": "5.7",
                "sku_name": "GP_Gen5_4",
                "storage_mb": 51200,
                "backup_retention_days": 7,
                "ssl_enforcement": "Disabled",
                "minimal_tls_version": "TLSEnforcementDisabled",
                "tags": {"env": "prod"}
            }),
        )
        .protected()
    }

    fn observed_server() -> ResourceState {
        ResourceState::new("/subscriptions/s/servers/prod-mysql", types::MYSQL_SERVER)
            .with_status(ResourceStatus::Ready)
            .with_attribute("name", json!("prod-mysql"))
            .with_attribute("administrator_login", json!("pulumiadmin"))
            .with_attribute("version", json!("5.7"))
            .with_attribute("sku_name", json!("GP_Gen5_4"))
            .with_attribute("storage_mb", json!(51200))
            .with_attribute("backup_retention_days", json!(7))
            .with_attribute("ssl_enforcement", json!("Disabled"))
            .with_attribute("minimal_tls_version", json!("TLSEnforcementDisabled"))
            .with_attribute("tags", json!({"env": "prod"}))
    }

    #[test]
    fn test_missing_resource_plans_create() {
        let action = diff_resource(&server_config(), None).unwrap();
        assert_eq!(action.action_type, ActionType::Create);
        assert_eq!(action.resource_key, "mysql-server:prod-mysql");
    }

    #[test]
    fn test_matching_resource_plans_noop() {
        let action = diff_resource(&server_config(), Some(&observed_server())).unwrap();
        assert_eq!(action.action_type, ActionType::NoOp);
    }

    #[test]
    fn test_mutable_drift_plans_update() {
        let mut current = observed_server();
        current.set_attribute("storage_mb", json!(25600));
        current.set_attribute("tags", json!({}));

        match classify_drift(&server_config(), &current) {
            Drift::Update(mut fields) => {
                fields.sort();
                assert_eq!(fields, vec!["storage_mb", "tags"]);
            }
            other => panic!("expected Update, got {other:?}"),
        }

        let action = diff_resource(&server_config(), Some(&current)).unwrap();
        assert_eq!(action.action_type, ActionType::Update);
    }

    #[test]
    fn test_immutable_drift_on_protected_fails_closed() {
        let mut current = observed_server();
        current.set_attribute("administrator_login", json!("someoneelse"));

        match diff_resource(&server_config(), Some(&current)) {
            Err(CloudError::ProtectedResource(key)) => {
                assert_eq!(key, "mysql-server:prod-mysql");
            }
            other => panic!("expected ProtectedResource, got {other:?}"),
        }
    }

    #[test]
    fn test_immutable_drift_on_unprotected_is_config_error() {
        let mut desired = server_config();
        desired.protect = false;
        let mut current = observed_server();
        current.set_attribute("version", json!("8.0"));

        assert!(matches!(
            diff_resource(&desired, Some(&current)),
            Err(CloudError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unreported_fields_are_not_drift() {
        let desired = server_config();
        let current = ResourceState::new("id", types::MYSQL_SERVER)
            .with_status(ResourceStatus::Ready)
            .with_attribute("name", json!("prod-mysql"));
        assert_eq!(classify_drift(&desired, &current), Drift::None);
    }

    #[test]
    fn test_relaxed_tls_settings_reported() {
        let relaxed = relaxed_tls_settings(&server_config());
        assert_eq!(relaxed.len(), 2);

        let hardened = ResourceConfig::new(
            types::MYSQL_SERVER,
            "s",
            "azure",
            json!({"ssl_enforcement": "Enabled", "minimal_tls_version": "TLS1_2"}),
        );
        assert!(relaxed_tls_settings(&hardened).is_empty());
    }

    #[test]
    fn test_blocking_failure_for_create_and_delete() {
        let mut set = ResourceSet::new();
        set.add(ResourceConfig::new(types::MYSQL_SERVER, "srv", "azure", json!({})));
        set.add(
            ResourceConfig::new(types::MYSQL_DATABASE, "db", "azure", json!({}))
                .with_parent("mysql-server:srv"),
        );

        let mut failed = HashSet::new();
        failed.insert("mysql-server:srv".to_string());

        let create_db = Action::new(ActionType::Create, types::MYSQL_DATABASE, "db", "create");
        assert_eq!(
            blocking_failure(&set, &create_db, &failed),
            Some("mysql-server:srv".to_string())
        );

        // Parent delete is blocked while the child's delete failed.
        let mut failed_child = HashSet::new();
        failed_child.insert("mysql-database:db".to_string());
        let delete_srv = Action::new(ActionType::Delete, types::MYSQL_SERVER, "srv", "delete");
        assert_eq!(
            blocking_failure(&set, &delete_srv, &failed_child),
            Some("mysql-database:db".to_string())
        );

        assert_eq!(blocking_failure(&set, &delete_srv, &HashSet::new()), None);
    }
}
