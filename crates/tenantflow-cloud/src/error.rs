//! Provisioning error types

use thiserror::Error;

/// Provisioning errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Name collision: {0}")]
    NameCollision(String),

    #[error("Failed to create {resource}: {reason}")]
    ResourceCreationFailed { resource: String, reason: String },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Failed to decode key material: {0}")]
    DecodeFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Circular dependency between: {0}")]
    CircularDependency(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn creation_failed(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        CloudError::ResourceCreationFailed {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
