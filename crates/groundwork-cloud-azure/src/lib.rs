//! Azure provider for Groundwork
//!
//! This crate implements the CloudProvider trait for Azure, covering the
//! MySQL single-server family (server, configuration, vnet rule, database)
//! and the storage family (account, blob container, access keys).
//!
//! # Requirements
//!
//! - the `az` CLI must be installed and logged in
//! - the target resource group must already exist (it is consumed as an
//!   externally supplied handle, never created here)
//!
//! # Example
//!
//! ```ignore
//! use groundwork_cloud_azure::AzureProvider;
//! use groundwork_cloud::CloudProvider;
//!
//! let provider = AzureProvider::new("rg-selfhosted");
//!
//! // Check authentication
//! let auth = provider.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//!
//! // Plan against live state
//! let plan = provider.plan(&desired).await?;
//! ```

pub mod azcli;
pub mod error;
pub mod provider;

pub use azcli::{
    AzCli, ContainerInfo, MysqlConfigurationConfig, MysqlConfigurationInfo, MysqlDatabaseConfig,
    MysqlDatabaseInfo, MysqlServerConfig, MysqlServerInfo, MysqlVnetRuleConfig, MysqlVnetRuleInfo,
    StorageAccountConfig, StorageAccountInfo, StorageContainerConfig,
};
pub use error::{AzureError, Result};
pub use provider::{AzureProvider, types};

/// Provider name as referenced by resource descriptors.
pub const PROVIDER_NAME: &str = "azure";
