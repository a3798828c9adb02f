//! Cloud provider trait definition

use crate::action::{ApplyResult, Plan};
use crate::error::Result;
use crate::resource::ResourceSet;
use crate::state::ProviderState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Cloud provider abstraction trait
///
/// Every call that touches the remote control plane is async and suspends
/// until the provider reports completion or failure; nothing here blocks a
/// shared thread. Implementations do not retry: transient-failure handling
/// belongs to the vendor tooling underneath.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "azure")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Observe the current remote state of the declared resources
    async fn get_state(&self, desired: &ResourceSet) -> Result<ProviderState>;

    /// Diff desired against observed state and produce an ordered plan
    async fn plan(&self, desired: &ResourceSet) -> Result<Plan>;

    /// Apply a plan in order, skipping dependents of failed actions
    async fn apply(&self, desired: &ResourceSet, plan: &Plan) -> Result<ApplyResult>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/subscription information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
