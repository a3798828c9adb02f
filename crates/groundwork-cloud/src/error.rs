//! Engine error types

use thiserror::Error;

/// Provisioning engine errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource name already taken: {0}")]
    NameConflict(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Circular dependency involving: {0}")]
    CircularDependency(String),

    #[error("Resource {resource} depends on {dependency}, which is not declared")]
    UnknownDependency { resource: String, dependency: String },

    #[error("Resource {0} is protected; deletion or replacement requires an explicit force override")]
    ProtectedResource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
