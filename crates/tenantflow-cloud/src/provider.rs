//! Provider trait definitions
//!
//! The source-control side (GitLab) and the cloud side (Google Cloud) are two
//! independent collaborators. Each only creates resources; ordering between
//! them is owned by the resource graph.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tenantflow_core::{CloudProject, ProtectedVariable, RepositoryProject, ServiceIdentity};

/// Source-control provider abstraction
#[async_trait]
pub trait SourceControlProvider: Send + Sync {
    /// Returns the provider name (e.g., "gitlab")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Create a project with its full policy profile
    async fn create_project(&self, project: &RepositoryProject) -> Result<ProjectRef>;

    /// Create or update a CI/CD variable, keyed by variable name and scope
    async fn set_protected_variable(
        &self,
        project: &ProjectRef,
        variable: &ProtectedVariable,
    ) -> Result<VariableRef>;
}

/// Cloud provider abstraction
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "gcp")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Create a cloud project
    async fn create_project(&self, project: &CloudProject) -> Result<CloudProjectRef>;

    /// Create a service identity inside an existing project
    async fn create_service_identity(
        &self,
        identity: &ServiceIdentity,
        project: &CloudProjectRef,
    ) -> Result<IdentityRef>;

    /// Generate a key for an existing service identity
    async fn create_key(&self, identity: &IdentityRef) -> Result<KeyMaterial>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
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

/// Reference to a created source-control project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    /// Numeric project ID assigned by the provider
    pub id: u64,

    /// Full path including namespace (e.g., "customers/first-customer")
    pub path_with_namespace: String,
}

/// Reference to a created cloud project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudProjectRef {
    pub project_id: String,
}

/// Reference to a created service identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRef {
    /// Identity email, used to address the identity in key requests
    pub email: String,

    pub unique_id: String,
}

/// Generated key material
///
/// `encoded` is exactly what the identity provider returned (base64).
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    /// Provider resource name of the key
    pub name: String,

    pub encoded: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("name", &self.name)
            .field("encoded", &"<redacted>")
            .finish()
    }
}

/// Reference to a stored CI/CD variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRef {
    pub key: String,
    pub environment_scope: String,
}

/// Polling configuration for long-running provider operations
///
/// Used by providers to wait on asynchronous operations they started. It is
/// never used to retry a failed create call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts
    pub max_attempts: u32,

    /// Initial delay between attempts
    pub initial_delay: std::time::Duration,

    /// Maximum delay between attempts
    pub max_delay: std::time::Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Delay before the given attempt (0-based)
    pub fn delay_for(&self, attempt: u32) -> std::time::Duration {
        let factor = self
            .backoff_multiplier
            .powi(i32::try_from(attempt).unwrap_or(i32::MAX));
        let secs = (self.initial_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64());
        std::time::Duration::from_secs_f64(secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            initial_delay: std::time::Duration::from_secs(1),
            max_delay: std::time::Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_retry_delay_backoff() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(0), Duration::from_secs(1));
        assert_eq!(config.delay_for(1), Duration::from_secs(2));
        assert_eq!(config.delay_for(3), Duration::from_secs(8));
        // capped at max_delay
        assert_eq!(config.delay_for(10), Duration::from_secs(30));
        assert_eq!(config.delay_for(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_key_material_debug_is_redacted() {
        let key = KeyMaterial {
            name: "keys/1".to_string(),
            encoded: "c2VjcmV0".to_string(),
        };
        assert!(!format!("{:?}", key).contains("c2VjcmV0"));
    }
}
