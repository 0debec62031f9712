//! GitLab provider implementation

use crate::api::{CreateProjectRequest, GitLabClient, GitLabConfig, VariableRequest};
use crate::error::GitLabError;
use async_trait::async_trait;
use tenantflow_cloud::{AuthStatus, CloudError, ProjectRef, SourceControlProvider, VariableRef};
use tenantflow_core::{ProtectedVariable, RepositoryProject};

/// GitLab provider
pub struct GitLabProvider {
    client: GitLabClient,
}

impl GitLabProvider {
    pub fn new(config: GitLabConfig) -> Self {
        Self {
            client: GitLabClient::new(config),
        }
    }

    pub fn from_env() -> crate::Result<Self> {
        Ok(Self::new(GitLabConfig::from_env()?))
    }
}

/// Report a failed create with the GitLab error as the reason
fn creation_failed(resource: String, error: GitLabError) -> CloudError {
    match error {
        GitLabError::Unauthorized(message) => CloudError::AuthenticationFailed(message),
        other => CloudError::creation_failed(resource, other.to_string()),
    }
}

#[async_trait]
impl SourceControlProvider for GitLabProvider {
    fn name(&self) -> &str {
        "gitlab"
    }

    fn display_name(&self) -> &str {
        "GitLab"
    }

    async fn check_auth(&self) -> tenantflow_cloud::Result<AuthStatus> {
        match self.client.current_user().await {
            Ok(user) => Ok(AuthStatus::ok(user.username)),
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn create_project(
        &self,
        project: &RepositoryProject,
    ) -> tenantflow_cloud::Result<ProjectRef> {
        let request = CreateProjectRequest::from(project);
        tracing::debug!("POST {}/projects name={}", self.client.base_url(), request.name);

        let created = self
            .client
            .create_project(&request)
            .await
            .map_err(|e| creation_failed(format!("gitlab project {}", project.name), e))?;

        tracing::info!(
            "Created GitLab project {} (id {})",
            created.path_with_namespace,
            created.id
        );
        Ok(ProjectRef {
            id: created.id,
            path_with_namespace: created.path_with_namespace,
        })
    }

    async fn set_protected_variable(
        &self,
        project: &ProjectRef,
        variable: &ProtectedVariable,
    ) -> tenantflow_cloud::Result<VariableRef> {
        let request = VariableRequest::from(variable);

        let stored = self
            .client
            .upsert_variable(project.id, &request)
            .await
            .map_err(|e| {
                creation_failed(
                    format!(
                        "variable {} on {}",
                        variable.key, project.path_with_namespace
                    ),
                    e,
                )
            })?;

        Ok(VariableRef {
            key: stored.key,
            environment_scope: stored
                .environment_scope
                .unwrap_or_else(|| variable.environment_scope.clone()),
        })
    }
}
