//! az CLI wrapper
//!
//! Wraps the `az` CLI for the MySQL single-server and storage-account
//! resource families, always requesting JSON output. Creation and read
//! calls block on the CLI, which itself waits for the control plane, so
//! callers suspend until the provider reports completion or failure.

use crate::error::{AzureError, Result};
use groundwork_cloud::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::process::Command;

/// Flags whose following value is secret material and must never be logged.
const REDACTED_FLAGS: &[&str] = &["--admin-password"];

/// az CLI wrapper
#[derive(Debug, Default)]
pub struct AzCli {
    subscription: Option<String>,
}

impl AzCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription(subscription: impl Into<String>) -> Self {
        Self {
            subscription: Some(subscription.into()),
        }
    }

    /// Check that az is installed and logged in
    pub async fn check_auth(&self) -> Result<AccountInfo> {
        let output = self.run(&arg_vec(&["account", "show"])).await?;
        let account: AccountInfo = serde_json::from_str(&output)?;
        Ok(account)
    }

    /// Run an az command and return stdout
    async fn run(&self, args: &[String]) -> Result<String> {
        let mut cmd = Command::new("az");
        cmd.args(args);
        if let Some(ref subscription) = self.subscription {
            cmd.arg("--subscription").arg(subscription);
        }
        cmd.arg("--output").arg("json");
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: az {}", render_for_log(args));

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AzureError::AzNotFound
            } else {
                AzureError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(classify_failure(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a `show`-style command, mapping provider not-found to `None`
    async fn show<T: serde::de::DeserializeOwned>(&self, args: &[String]) -> Result<Option<T>> {
        match self.run(args).await {
            Ok(output) => Ok(Some(serde_json::from_str(&output)?)),
            Err(AzureError::ResourceNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ----- MySQL single server family -----

    pub async fn get_mysql_server(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<MysqlServerInfo>> {
        self.show(&arg_vec(&[
            "mysql",
            "server",
            "show",
            "--resource-group",
            resource_group,
            "--name",
            name,
        ]))
        .await
    }

    /// Create a MySQL server. The admin password only crosses this
    /// boundary revealed; it never appears in logs or errors.
    pub async fn create_mysql_server(
        &self,
        resource_group: &str,
        config: &MysqlServerConfig,
        admin_password: &SecretString,
    ) -> Result<MysqlServerInfo> {
        let storage = config.storage_mb.to_string();
        let retention = config.backup_retention_days.to_string();
        let mut args = arg_vec(&[
            "mysql",
            "server",
            "create",
            "--resource-group",
            resource_group,
            "--name",
            &config.name,
            "--admin-user",
            &config.administrator_login,
            "--admin-password",
            admin_password.reveal(),
            "--version",
            &config.version,
            "--sku-name",
            &config.sku_name,
            "--storage-size",
            &storage,
            "--backup-retention",
            &retention,
            "--geo-redundant-backup",
            &config.geo_redundant_backup,
            "--auto-grow",
            &config.auto_grow,
            "--infrastructure-encryption",
            &config.infrastructure_encryption,
            "--public",
            &config.public_network_access,
            "--ssl-enforcement",
            &config.ssl_enforcement,
            "--minimal-tls-version",
            &config.minimal_tls_version,
        ]);
        args.extend(tag_args(&config.tags));

        let output = self.run(&args).await?;
        Ok(serde_json::from_str(&output)?)
    }

    /// Update the mutable server settings (storage, retention, autogrow, tags)
    pub async fn update_mysql_server(
        &self,
        resource_group: &str,
        config: &MysqlServerConfig,
    ) -> Result<MysqlServerInfo> {
        let storage = config.storage_mb.to_string();
        let retention = config.backup_retention_days.to_string();
        let mut args = arg_vec(&[
            "mysql",
            "server",
            "update",
            "--resource-group",
            resource_group,
            "--name",
            &config.name,
            "--storage-size",
            &storage,
            "--backup-retention",
            &retention,
            "--auto-grow",
            &config.auto_grow,
            "--ssl-enforcement",
            &config.ssl_enforcement,
            "--minimal-tls-version",
            &config.minimal_tls_version,
        ]);
        args.extend(tag_args(&config.tags));

        let output = self.run(&args).await?;
        Ok(serde_json::from_str(&output)?)
    }

    pub async fn delete_mysql_server(&self, resource_group: &str, name: &str) -> Result<()> {
        self.run(&arg_vec(&[
            "mysql",
            "server",
            "delete",
            "--resource-group",
            resource_group,
            "--name",
            name,
            "--yes",
        ]))
        .await?;
        Ok(())
    }

    pub async fn get_mysql_configuration(
        &self,
        resource_group: &str,
        server_name: &str,
        name: &str,
    ) -> Result<Option<MysqlConfigurationInfo>> {
        self.show(&arg_vec(&[
            "mysql",
            "server",
            "configuration",
            "show",
            "--resource-group",
            resource_group,
            "--server-name",
            server_name,
            "--name",
            name,
        ]))
        .await
    }

    /// Upsert a server parameter. `set` both creates and updates.
    pub async fn set_mysql_configuration(
        &self,
        resource_group: &str,
        config: &MysqlConfigurationConfig,
    ) -> Result<MysqlConfigurationInfo> {
        let output = self
            .run(&arg_vec(&[
                "mysql",
                "server",
                "configuration",
                "set",
                "--resource-group",
                resource_group,
                "--server-name",
                &config.server_name,
                "--name",
                &config.name,
                "--value",
                &config.value,
            ]))
            .await?;
        Ok(serde_json::from_str(&output)?)
    }

    pub async fn get_mysql_vnet_rule(
        &self,
        resource_group: &str,
        server_name: &str,
        name: &str,
    ) -> Result<Option<MysqlVnetRuleInfo>> {
        self.show(&arg_vec(&[
            "mysql",
            "server",
            "vnet-rule",
            "show",
            "--resource-group",
            resource_group,
            "--server-name",
            server_name,
            "--name",
            name,
        ]))
        .await
    }

    /// Upsert the subnet binding of a server. `create` overwrites an
    /// existing rule of the same name.
    pub async fn create_mysql_vnet_rule(
        &self,
        resource_group: &str,
        config: &MysqlVnetRuleConfig,
    ) -> Result<MysqlVnetRuleInfo> {
        let output = self
            .run(&arg_vec(&[
                "mysql",
                "server",
                "vnet-rule",
                "create",
                "--resource-group",
                resource_group,
                "--server-name",
                &config.server_name,
                "--name",
                &config.name,
                "--subnet",
                &config.subnet_id,
            ]))
            .await?;
        Ok(serde_json::from_str(&output)?)
    }

    pub async fn delete_mysql_vnet_rule(
        &self,
        resource_group: &str,
        server_name: &str,
        name: &str,
    ) -> Result<()> {
        self.run(&arg_vec(&[
            "mysql",
            "server",
            "vnet-rule",
            "delete",
            "--resource-group",
            resource_group,
            "--server-name",
            server_name,
            "--name",
            name,
        ]))
        .await?;
        Ok(())
    }

    pub async fn get_mysql_database(
        &self,
        resource_group: &str,
        server_name: &str,
        name: &str,
    ) -> Result<Option<MysqlDatabaseInfo>> {
        self.show(&arg_vec(&[
            "mysql",
            "db",
            "show",
            "--resource-group",
            resource_group,
            "--server-name",
            server_name,
            "--name",
            name,
        ]))
        .await
    }

    pub async fn create_mysql_database(
        &self,
        resource_group: &str,
        config: &MysqlDatabaseConfig,
    ) -> Result<MysqlDatabaseInfo> {
        let output = self
            .run(&arg_vec(&[
                "mysql",
                "db",
                "create",
                "--resource-group",
                resource_group,
                "--server-name",
                &config.server_name,
                "--name",
                &config.name,
            ]))
            .await?;
        Ok(serde_json::from_str(&output)?)
    }

    pub async fn delete_mysql_database(
        &self,
        resource_group: &str,
        server_name: &str,
        name: &str,
    ) -> Result<()> {
        self.run(&arg_vec(&[
            "mysql",
            "db",
            "delete",
            "--resource-group",
            resource_group,
            "--server-name",
            server_name,
            "--name",
            name,
            "--yes",
        ]))
        .await?;
        Ok(())
    }

    // ----- Storage family -----

    pub async fn get_storage_account(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<StorageAccountInfo>> {
        self.show(&arg_vec(&[
            "storage",
            "account",
            "show",
            "--resource-group",
            resource_group,
            "--name",
            name,
        ]))
        .await
    }

    pub async fn create_storage_account(
        &self,
        resource_group: &str,
        config: &StorageAccountConfig,
    ) -> Result<StorageAccountInfo> {
        let mut args = arg_vec(&[
            "storage",
            "account",
            "create",
            "--resource-group",
            resource_group,
            "--name",
            &config.name,
            "--sku",
            &config.sku_name,
            "--kind",
            &config.kind,
        ]);
        args.extend(tag_args(&config.tags));

        let output = self.run(&args).await?;
        Ok(serde_json::from_str(&output)?)
    }

    pub async fn update_storage_account(
        &self,
        resource_group: &str,
        config: &StorageAccountConfig,
    ) -> Result<StorageAccountInfo> {
        let mut args = arg_vec(&[
            "storage",
            "account",
            "update",
            "--resource-group",
            resource_group,
            "--name",
            &config.name,
            "--sku",
            &config.sku_name,
        ]);
        args.extend(tag_args(&config.tags));

        let output = self.run(&args).await?;
        Ok(serde_json::from_str(&output)?)
    }

    pub async fn delete_storage_account(&self, resource_group: &str, name: &str) -> Result<()> {
        self.run(&arg_vec(&[
            "storage",
            "account",
            "delete",
            "--resource-group",
            resource_group,
            "--name",
            name,
            "--yes",
        ]))
        .await?;
        Ok(())
    }

    pub async fn get_container(
        &self,
        resource_group: &str,
        account_name: &str,
        name: &str,
    ) -> Result<Option<ContainerInfo>> {
        self.show(&arg_vec(&[
            "storage",
            "container-rm",
            "show",
            "--resource-group",
            resource_group,
            "--storage-account",
            account_name,
            "--name",
            name,
        ]))
        .await
    }

    pub async fn create_container(
        &self,
        resource_group: &str,
        config: &StorageContainerConfig,
    ) -> Result<ContainerInfo> {
        let output = self
            .run(&arg_vec(&[
                "storage",
                "container-rm",
                "create",
                "--resource-group",
                resource_group,
                "--storage-account",
                &config.account_name,
                "--name",
                &config.name,
            ]))
            .await?;
        Ok(serde_json::from_str(&output)?)
    }

    pub async fn delete_container(
        &self,
        resource_group: &str,
        account_name: &str,
        name: &str,
    ) -> Result<()> {
        self.run(&arg_vec(&[
            "storage",
            "container-rm",
            "delete",
            "--resource-group",
            resource_group,
            "--storage-account",
            account_name,
            "--name",
            name,
            "--yes",
        ]))
        .await?;
        Ok(())
    }

    /// Read the account's access keys. A read against the live resource,
    /// valid only once the account is provisioned.
    pub async fn list_storage_account_keys(
        &self,
        resource_group: &str,
        account_name: &str,
    ) -> Result<Vec<StorageAccountKey>> {
        let output = self
            .run(&arg_vec(&[
                "storage",
                "account",
                "keys",
                "list",
                "--resource-group",
                resource_group,
                "--account-name",
                account_name,
            ]))
            .await?;
        Ok(serde_json::from_str(&output)?)
    }
}

fn arg_vec(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// `--tags k=v ...` pairs, deterministic order
fn tag_args(tags: &BTreeMap<String, String>) -> Vec<String> {
    if tags.is_empty() {
        return Vec::new();
    }
    let mut args = vec!["--tags".to_string()];
    args.extend(tags.iter().map(|(k, v)| format!("{k}={v}")));
    args
}

/// Render a command line for the debug log, redacting secret flag values
fn render_for_log(args: &[String]) -> String {
    let mut rendered: Vec<&str> = Vec::with_capacity(args.len());
    let mut redact_next = false;
    for arg in args {
        if redact_next {
            rendered.push(groundwork_cloud::secret::REDACTED);
            redact_next = false;
            continue;
        }
        if REDACTED_FLAGS.contains(&arg.as_str()) {
            redact_next = true;
        }
        rendered.push(arg.as_str());
    }
    rendered.join(" ")
}

fn classify_failure(stderr: String) -> AzureError {
    let trimmed = stderr.trim().to_string();
    if is_not_found(&trimmed) {
        AzureError::ResourceNotFound(trimmed)
    } else if is_name_conflict(&trimmed) {
        AzureError::NameConflict(trimmed)
    } else if is_auth_failure(&trimmed) {
        AzureError::AuthenticationFailed(trimmed)
    } else {
        AzureError::CommandFailed(trimmed)
    }
}

fn is_not_found(stderr: &str) -> bool {
    const MARKERS: &[&str] = &[
        "ResourceNotFound",
        "ResourceGroupNotFound",
        "was not found",
        "could not be found",
        "does not exist",
    ];
    MARKERS.iter().any(|m| stderr.contains(m))
}

fn is_name_conflict(stderr: &str) -> bool {
    const MARKERS: &[&str] = &[
        "already exists",
        "AlreadyExists",
        "NameNotAvailable",
        "already taken",
    ];
    MARKERS.iter().any(|m| stderr.contains(m))
}

fn is_auth_failure(stderr: &str) -> bool {
    const MARKERS: &[&str] = &["az login", "AuthorizationFailed", "AADSTS", "ExpiredAuthenticationToken"];
    MARKERS.iter().any(|m| stderr.contains(m))
}

// ----- Desired configuration payloads -----
//
// These are the typed shapes of `ResourceConfig.config` for each resource
// type; the provider deserializes them back out at apply time. Secrets
// (the admin password) are deliberately absent: they travel in
// `ResourceConfig.secrets`.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysqlServerConfig {
    /// Cloud-side server name; part of the public host name
    pub name: String,
    pub administrator_login: String,
    pub version: String,
    pub sku_name: String,
    pub storage_mb: u32,
    pub backup_retention_days: u32,
    pub geo_redundant_backup: String,
    pub auto_grow: String,
    pub infrastructure_encryption: String,
    pub public_network_access: String,
    pub ssl_enforcement: String,
    pub minimal_tls_version: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysqlConfigurationConfig {
    pub server_name: String,
    pub name: String,
    pub value: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysqlVnetRuleConfig {
    pub server_name: String,
    pub name: String,
    pub subnet_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysqlDatabaseConfig {
    pub server_name: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageAccountConfig {
    pub name: String,
    pub sku_name: String,
    pub kind: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageContainerConfig {
    pub account_name: String,
    pub name: String,
}

// ----- az JSON payloads -----

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub user: Option<AccountUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUser {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MysqlServerInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fully_qualified_domain_name: Option<String>,
    #[serde(default)]
    pub administrator_login: Option<String>,
    #[serde(default)]
    pub user_visible_state: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub sku: Option<SkuInfo>,
    #[serde(default)]
    pub ssl_enforcement: Option<String>,
    #[serde(default)]
    pub minimal_tls_version: Option<String>,
    #[serde(default)]
    pub storage_profile: Option<StorageProfileInfo>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
}

impl MysqlServerInfo {
    pub fn is_ready(&self) -> bool {
        self.user_visible_state.as_deref() == Some("Ready")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuInfo {
    pub name: String,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub family: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfileInfo {
    #[serde(default)]
    pub backup_retention_days: Option<u32>,
    #[serde(default)]
    pub geo_redundant_backup: Option<String>,
    #[serde(default)]
    pub storage_autogrow: Option<String>,
    #[serde(default, alias = "storageMB")]
    pub storage_mb: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MysqlConfigurationInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MysqlVnetRuleInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub virtual_network_subnet_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MysqlDatabaseInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub charset: Option<String>,
    #[serde(default)]
    pub collation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub sku: Option<StorageSkuInfo>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
}

impl StorageAccountInfo {
    pub fn is_ready(&self) -> bool {
        self.provisioning_state.as_deref() == Some("Succeeded")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSkuInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
}

/// One entry of `az storage account keys list`. The key value
/// deserializes straight into a redacting wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountKey {
    pub key_name: String,
    pub value: SecretString,
    #[serde(default)]
    pub permissions: Option<String>,
}
