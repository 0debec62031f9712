//! Google Cloud REST clients
//!
//! Resource Manager v1 for projects and IAM v1 for service accounts and
//! keys. Requests carry an OAuth2 access token as a bearer token.

use crate::error::{GcpError, Result};
use serde::{Deserialize, Serialize};
use tenantflow_cloud::RetryConfig;
use tenantflow_core::{CloudProject, ServiceIdentity};

pub const RESOURCE_MANAGER_API: &str = "https://cloudresourcemanager.googleapis.com/v1";
pub const IAM_API: &str = "https://iam.googleapis.com/v1";
pub const OAUTH_API: &str = "https://oauth2.googleapis.com";

/// Configuration for the API clients
#[derive(Clone)]
pub struct GcpConfig {
    pub access_token: String,

    /// Organization new projects are created under
    pub organization_id: Option<String>,

    pub resource_manager_url: String,
    pub iam_url: String,
    pub oauth_url: String,

    /// Polling of project creation operations
    pub retry: RetryConfig,
}

impl std::fmt::Debug for GcpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpConfig")
            .field("access_token", &"<redacted>")
            .field("organization_id", &self.organization_id)
            .field("resource_manager_url", &self.resource_manager_url)
            .field("iam_url", &self.iam_url)
            .field("oauth_url", &self.oauth_url)
            .field("retry", &self.retry)
            .finish()
    }
}

impl GcpConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            organization_id: None,
            resource_manager_url: RESOURCE_MANAGER_API.to_string(),
            iam_url: IAM_API.to_string(),
            oauth_url: OAUTH_API.to_string(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Send every request to one base URL
    pub fn with_endpoint(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.resource_manager_url = base_url.clone();
        self.iam_url = base_url.clone();
        self.oauth_url = base_url;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Create GcpConfig from environment variables
    ///
    /// `GOOGLE_OAUTH_ACCESS_TOKEN` is required; `GOOGLE_CLOUD_ORG_ID` is
    /// optional.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN").map_err(|_| {
            GcpError::MissingEnvVar("GOOGLE_OAUTH_ACCESS_TOKEN".to_string())
        })?;
        if token.trim().is_empty() {
            return Err(GcpError::InvalidConfig(
                "GOOGLE_OAUTH_ACCESS_TOKEN is empty".to_string(),
            ));
        }

        let config = Self::new(token.trim());
        Ok(match std::env::var("GOOGLE_CLOUD_ORG_ID") {
            Ok(org) if !org.trim().is_empty() => config.with_organization(org.trim()),
            _ => config,
        })
    }
}

/// Google Cloud API client
pub struct GcpClient {
    client: reqwest::Client,
    config: GcpConfig,
}

impl GcpClient {
    pub fn new(config: GcpConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GcpConfig {
        &self.config
    }

    fn resource_manager(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.config.resource_manager_url.trim_end_matches('/'),
            path
        )
    }

    fn iam(&self, path: &str) -> String {
        format!("{}{}", self.config.iam_url.trim_end_matches('/'), path)
    }

    /// Identity behind the access token
    pub async fn token_info(&self) -> Result<TokenInfo> {
        let url = format!("{}/tokeninfo", self.config.oauth_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("access_token", self.config.access_token.as_str())])
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Start project creation. Returns the long-running operation.
    pub async fn create_project(&self, request: &CreateProjectRequest) -> Result<Operation> {
        let response = self
            .client
            .post(self.resource_manager("/projects"))
            .bearer_auth(&self.config.access_token)
            .json(request)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn get_operation(&self, name: &str) -> Result<Operation> {
        let response = self
            .client
            .get(self.resource_manager(&format!("/{}", name)))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Poll an operation until it is done
    pub async fn wait_for_operation(&self, operation: Operation) -> Result<Operation> {
        let retry = &self.config.retry;
        let mut operation = operation;
        let mut attempt = 0;

        loop {
            if operation.done {
                if let Some(error) = &operation.error {
                    return Err(GcpError::OperationFailed {
                        name: operation.name.clone(),
                        message: error.message.clone(),
                    });
                }
                return Ok(operation);
            }
            if attempt >= retry.max_attempts {
                return Err(GcpError::OperationTimeout(operation.name));
            }

            let delay = retry.delay_for(attempt);
            tracing::debug!(
                "Operation {} pending, checking again in {:?}",
                operation.name,
                delay
            );
            tokio::time::sleep(delay).await;
            operation = self.get_operation(&operation.name).await?;
            attempt += 1;
        }
    }

    pub async fn create_service_account(
        &self,
        project_id: &str,
        request: &CreateServiceAccountRequest,
    ) -> Result<ApiServiceAccount> {
        let url = self.iam(&format!("/projects/{}/serviceAccounts", project_id));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(request)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn create_key(&self, email: &str) -> Result<ApiServiceAccountKey> {
        let url = self.iam(&format!("/projects/-/serviceAccounts/{}/keys", email));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

/// Map non-success responses to errors
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GcpError::Unauthorized(message));
    }
    Err(GcpError::ApiError {
        status: status.as_u16(),
        message,
    })
}

// ============ API Types ============

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub project_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceId>,
}

impl CreateProjectRequest {
    pub fn new(project: &CloudProject, organization_id: Option<&str>) -> Self {
        Self {
            project_id: project.project_id.clone(),
            name: project.name.clone(),
            parent: organization_id.map(|id| ResourceId {
                r#type: "organization".to_string(),
                id: id.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceId {
    pub r#type: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceAccountRequest {
    pub account_id: String,
    pub service_account: ServiceAccountBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountBody {
    pub display_name: String,
}

impl From<&ServiceIdentity> for CreateServiceAccountRequest {
    fn from(identity: &ServiceIdentity) -> Self {
        Self {
            account_id: identity.account_id.clone(),
            service_account: ServiceAccountBody {
                display_name: identity.display_name.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<Status>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiServiceAccount {
    pub name: String,
    pub email: String,
    pub unique_id: String,
}

/// Created key. `private_key_data` is base64 and is only returned once.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiServiceAccountKey {
    pub name: String,
    pub private_key_data: String,
}

impl std::fmt::Debug for ApiServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiServiceAccountKey")
            .field("name", &self.name)
            .field("private_key_data", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Status,
}
