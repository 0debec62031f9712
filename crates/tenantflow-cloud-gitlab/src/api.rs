//! GitLab REST API client
//!
//! Talks to the v4 API with a personal or group access token sent in the
//! `PRIVATE-TOKEN` header.

use crate::error::{GitLabError, Result};
use serde::{Deserialize, Serialize};
use tenantflow_core::{ProtectedVariable, RepositoryProject};

pub const GITLAB_API_BASE: &str = "https://gitlab.com/api/v4";

/// Configuration for the API client
#[derive(Clone)]
pub struct GitLabConfig {
    pub token: String,
    pub base_url: String,
}

impl std::fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GitLabConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: GITLAB_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create GitLabConfig from environment variables
    ///
    /// `GITLAB_TOKEN` is required; `GITLAB_BASE_URL` defaults to gitlab.com.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITLAB_TOKEN")
            .map_err(|_| GitLabError::MissingEnvVar("GITLAB_TOKEN".to_string()))?;
        if token.trim().is_empty() {
            return Err(GitLabError::InvalidConfig("GITLAB_TOKEN is empty".to_string()));
        }

        let config = Self::new(token);
        Ok(match std::env::var("GITLAB_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => config.with_base_url(url),
            _ => config,
        })
    }
}

/// GitLab API client
pub struct GitLabClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl GitLabClient {
    pub fn new(config: GitLabConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: config.token,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The user owning the token
    pub async fn current_user(&self) -> Result<ApiUser> {
        let response = self
            .client
            .get(self.url("/user"))
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn create_project(&self, request: &CreateProjectRequest) -> Result<ApiProject> {
        let response = self
            .client
            .post(self.url("/projects"))
            .header("PRIVATE-TOKEN", &self.token)
            .json(request)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Look up a variable by key and environment scope
    pub async fn get_variable(
        &self,
        project_id: u64,
        key: &str,
        environment_scope: &str,
    ) -> Result<Option<ApiVariable>> {
        let url = self.url(&format!("/projects/{}/variables/{}", project_id, key));
        let response = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("filter[environment_scope]", environment_scope)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response).await?.json().await?))
    }

    pub async fn create_variable(
        &self,
        project_id: u64,
        request: &VariableRequest,
    ) -> Result<ApiVariable> {
        let url = self.url(&format!("/projects/{}/variables", project_id));
        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(request)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn update_variable(
        &self,
        project_id: u64,
        request: &VariableRequest,
    ) -> Result<ApiVariable> {
        let url = self.url(&format!(
            "/projects/{}/variables/{}",
            project_id, request.key
        ));
        let response = self
            .client
            .put(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[(
                "filter[environment_scope]",
                request.environment_scope.as_str(),
            )])
            .json(request)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Create the variable, or overwrite it if one with the same key and
    /// scope already exists
    pub async fn upsert_variable(
        &self,
        project_id: u64,
        request: &VariableRequest,
    ) -> Result<ApiVariable> {
        match self
            .get_variable(project_id, &request.key, &request.environment_scope)
            .await?
        {
            Some(_) => {
                tracing::debug!("Variable {} exists, updating", request.key);
                self.update_variable(project_id, request).await
            }
            None => self.create_variable(project_id, request).await,
        }
    }
}

/// Map non-success responses to errors
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GitLabError::Unauthorized(message));
    }
    Err(GitLabError::ApiError {
        status: status.as_u16(),
        message,
    })
}

/// GitLab puts errors under `message` (string or field map) or `error`
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    match value.get("message").or_else(|| value.get("error")) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}

// ============ API Types ============

#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub path: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<i64>,
    pub visibility: String,
    pub default_branch: String,
    pub jobs_enabled: bool,
    pub issues_enabled: bool,
    pub wiki_enabled: bool,
    pub snippets_enabled: bool,
    pub container_registry_enabled: bool,
    pub merge_requests_enabled: bool,
    pub merge_method: String,
    pub only_allow_merge_if_pipeline_succeeds: bool,
    pub shared_runners_enabled: bool,
}

impl From<&RepositoryProject> for CreateProjectRequest {
    fn from(project: &RepositoryProject) -> Self {
        let policy = &project.policy;
        Self {
            name: project.name.clone(),
            path: project.name.clone(),
            description: project.description.clone(),
            namespace_id: project.namespace_id,
            visibility: policy.visibility.to_string(),
            default_branch: policy.default_branch.to_string(),
            jobs_enabled: policy.pipelines_enabled,
            issues_enabled: policy.issues_enabled,
            wiki_enabled: policy.wiki_enabled,
            snippets_enabled: policy.snippets_enabled,
            container_registry_enabled: policy.container_registry_enabled,
            merge_requests_enabled: policy.merge_requests_enabled,
            merge_method: policy.merge_method.to_string(),
            only_allow_merge_if_pipeline_succeeds: policy.only_allow_merge_if_pipeline_succeeds,
            shared_runners_enabled: policy.shared_runners_enabled,
        }
    }
}

#[derive(Clone, Serialize)]
pub struct VariableRequest {
    pub key: String,
    pub value: String,
    pub protected: bool,
    pub variable_type: String,
    pub environment_scope: String,
}

impl std::fmt::Debug for VariableRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableRequest")
            .field("key", &self.key)
            .field("value", &"<redacted>")
            .field("protected", &self.protected)
            .field("variable_type", &self.variable_type)
            .field("environment_scope", &self.environment_scope)
            .finish()
    }
}

impl From<&ProtectedVariable> for VariableRequest {
    fn from(variable: &ProtectedVariable) -> Self {
        Self {
            key: variable.key.clone(),
            value: variable.value.clone(),
            protected: variable.protected,
            variable_type: variable.variable_type.to_string(),
            environment_scope: variable.environment_scope.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiProject {
    pub id: u64,
    pub path_with_namespace: String,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// Variable as returned by the API. The value is never deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiVariable {
    pub key: String,
    #[serde(default)]
    pub environment_scope: Option<String>,
    #[serde(default)]
    pub protected: bool,
}
