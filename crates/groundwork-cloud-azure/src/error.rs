//! Azure provider error types

use groundwork_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az CLI not found. Install the Azure CLI: https://aka.ms/installazurecli")]
    AzNotFound,

    #[error("az authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("az command failed: {0}")]
    CommandFailed(String),

    #[error("resource name already taken: {0}")]
    NameConflict(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cloud error: {0}")]
    Cloud(#[from] CloudError),
}

pub type Result<T> = std::result::Result<T, AzureError>;

impl From<AzureError> for CloudError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            AzureError::NameConflict(name) => CloudError::NameConflict(name),
            AzureError::ResourceNotFound(name) => CloudError::ResourceNotFound(name),
            AzureError::InvalidConfig(msg) => CloudError::InvalidConfig(msg),
            AzureError::CommandFailed(msg) => CloudError::CommandFailed(msg),
            AzureError::Cloud(inner) => inner,
            other => CloudError::ApiError(other.to_string()),
        }
    }
}
