//! Google Cloud provider implementation

use crate::api::{CreateProjectRequest, CreateServiceAccountRequest, GcpClient, GcpConfig};
use crate::error::GcpError;
use async_trait::async_trait;
use tenantflow_cloud::{
    AuthStatus, CloudError, CloudProjectRef, CloudProvider, IdentityRef, KeyMaterial,
};
use tenantflow_core::{CloudProject, ServiceIdentity};

/// Google Cloud provider
pub struct GcpProvider {
    client: GcpClient,
}

impl GcpProvider {
    pub fn new(config: GcpConfig) -> Self {
        Self {
            client: GcpClient::new(config),
        }
    }

    pub fn from_env() -> crate::Result<Self> {
        Ok(Self::new(GcpConfig::from_env()?))
    }
}

fn creation_failed(resource: String, error: GcpError) -> CloudError {
    match error {
        GcpError::Unauthorized(message) => CloudError::AuthenticationFailed(message),
        other => CloudError::creation_failed(resource, other.to_string()),
    }
}

#[async_trait]
impl CloudProvider for GcpProvider {
    fn name(&self) -> &str {
        "gcp"
    }

    fn display_name(&self) -> &str {
        "Google Cloud"
    }

    async fn check_auth(&self) -> tenantflow_cloud::Result<AuthStatus> {
        match self.client.token_info().await {
            Ok(info) => Ok(AuthStatus::ok(
                info.email.unwrap_or_else(|| "Unknown".to_string()),
            )),
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn create_project(
        &self,
        project: &CloudProject,
    ) -> tenantflow_cloud::Result<CloudProjectRef> {
        let resource = format!("gcp project {}", project.project_id);
        let request =
            CreateProjectRequest::new(project, self.client.config().organization_id.as_deref());

        let operation = self
            .client
            .create_project(&request)
            .await
            .map_err(|e| creation_failed(resource.clone(), e))?;
        tracing::debug!("Project creation started: {}", operation.name);

        self.client
            .wait_for_operation(operation)
            .await
            .map_err(|e| creation_failed(resource, e))?;

        tracing::info!("Created Google Cloud project {}", project.project_id);
        Ok(CloudProjectRef {
            project_id: project.project_id.clone(),
        })
    }

    async fn create_service_identity(
        &self,
        identity: &ServiceIdentity,
        project: &CloudProjectRef,
    ) -> tenantflow_cloud::Result<IdentityRef> {
        let request = CreateServiceAccountRequest::from(identity);

        let account = self
            .client
            .create_service_account(&project.project_id, &request)
            .await
            .map_err(|e| {
                creation_failed(
                    format!(
                        "service account {} in {}",
                        identity.account_id, project.project_id
                    ),
                    e,
                )
            })?;

        tracing::info!("Created service account {}", account.email);
        Ok(IdentityRef {
            email: account.email,
            unique_id: account.unique_id,
        })
    }

    async fn create_key(&self, identity: &IdentityRef) -> tenantflow_cloud::Result<KeyMaterial> {
        let key = self
            .client
            .create_key(&identity.email)
            .await
            .map_err(|e| creation_failed(format!("key for {}", identity.email), e))?;

        tracing::info!("Created key {}", key.name);
        Ok(KeyMaterial {
            name: key.name,
            encoded: key.private_key_data,
        })
    }
}
