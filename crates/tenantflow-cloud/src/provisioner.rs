//! Provisioning components
//!
//! - repository: the GitLab project with the fixed customer policy
//! - cloud infra: GCP project -> service account -> key, only when requested
//! - secret wiring: decoded key injected as a protected file variable
//!
//! Each step surfaces provider errors unmodified and never retries or rolls
//! back. Ordering between steps is the caller's concern (see [`crate::engine`]).

use crate::error::{CloudError, Result};
use crate::provider::{
    CloudProjectRef, CloudProvider, IdentityRef, ProjectRef, SourceControlProvider, VariableRef,
};
use crate::secret::decode_key_material;
use std::sync::Arc;
use tenantflow_core::{
    CloudProject, CustomerSpec, IdentityKey, Identifiers, ProtectedVariable, RepositoryProject,
    ServiceIdentity,
};

/// A repository that exists on the provider
#[derive(Debug, Clone)]
pub struct ProvisionedRepository {
    pub project: RepositoryProject,
    pub reference: ProjectRef,
}

/// A cloud project that exists on the provider
#[derive(Debug, Clone)]
pub struct ProvisionedCloudProject {
    pub project: CloudProject,
    pub reference: CloudProjectRef,
}

/// A service identity that exists on the provider
#[derive(Debug, Clone)]
pub struct ProvisionedIdentity {
    pub identity: ServiceIdentity,
    pub reference: IdentityRef,
}

/// A variable stored on the repository
#[derive(Debug, Clone)]
pub struct ProvisionedVariable {
    pub variable: ProtectedVariable,
    pub reference: VariableRef,
}

/// The complete set of cloud resources of one unit
#[derive(Debug, Clone)]
pub struct CloudResources {
    pub project: ProvisionedCloudProject,
    pub identity: ProvisionedIdentity,
    pub key: IdentityKey,
}

/// Result of the cloud infra step
///
/// Cloud resources are only reachable through `Present`, which is only
/// built once all three exist.
#[derive(Debug, Clone)]
pub enum CloudInfra {
    Absent,
    Present(CloudResources),
}

impl CloudInfra {
    pub fn is_present(&self) -> bool {
        matches!(self, CloudInfra::Present(_))
    }

    pub fn resources(&self) -> Option<&CloudResources> {
        match self {
            CloudInfra::Absent => None,
            CloudInfra::Present(resources) => Some(resources),
        }
    }
}

/// Runs the provisioning components against a pair of providers
#[derive(Clone)]
pub struct Provisioner {
    source_control: Arc<dyn SourceControlProvider>,
    cloud: Arc<dyn CloudProvider>,
}

impl Provisioner {
    pub fn new(
        source_control: Arc<dyn SourceControlProvider>,
        cloud: Arc<dyn CloudProvider>,
    ) -> Self {
        Self {
            source_control,
            cloud,
        }
    }

    pub fn source_control(&self) -> &dyn SourceControlProvider {
        self.source_control.as_ref()
    }

    pub fn cloud(&self) -> &dyn CloudProvider {
        self.cloud.as_ref()
    }

    /// Create the customer's repository. Runs for every unit.
    pub async fn provision_repository(
        &self,
        ids: &Identifiers,
        spec: &CustomerSpec,
    ) -> Result<ProvisionedRepository> {
        let project = RepositoryProject::for_customer(ids, spec);
        tracing::info!(
            "Creating {} project: {}",
            self.source_control.display_name(),
            project.name
        );

        let reference = self.source_control.create_project(&project).await?;
        tracing::debug!(
            "Created project {} (id {})",
            reference.path_with_namespace,
            reference.id
        );
        Ok(ProvisionedRepository { project, reference })
    }

    /// Create project, service account and key, in that order
    ///
    /// Returns `Absent` without touching the provider when the customer does
    /// not need cloud infrastructure. A failing step stops the remaining ones;
    /// anything already created is left in place.
    pub async fn provision_cloud_infra(
        &self,
        ids: &Identifiers,
        spec: &CustomerSpec,
    ) -> Result<CloudInfra> {
        if !spec.needs_cloud_infra {
            return Ok(CloudInfra::Absent);
        }

        let project = self.create_cloud_project(ids, spec).await?;
        let identity = self.create_service_identity(&project, ids, spec).await?;
        let key = self.create_identity_key(&identity).await?;

        Ok(CloudInfra::Present(CloudResources {
            project,
            identity,
            key,
        }))
    }

    pub async fn create_cloud_project(
        &self,
        ids: &Identifiers,
        spec: &CustomerSpec,
    ) -> Result<ProvisionedCloudProject> {
        let project = CloudProject::for_customer(ids, spec);
        tracing::info!(
            "Creating {} project: {}",
            self.cloud.display_name(),
            project.project_id
        );

        let reference = self.cloud.create_project(&project).await?;
        Ok(ProvisionedCloudProject { project, reference })
    }

    pub async fn create_service_identity(
        &self,
        project: &ProvisionedCloudProject,
        ids: &Identifiers,
        spec: &CustomerSpec,
    ) -> Result<ProvisionedIdentity> {
        let identity = ServiceIdentity::scoped_to(&project.project, ids, spec);
        tracing::info!(
            "Creating service account {} in {}",
            identity.account_id,
            project.reference.project_id
        );

        let reference = self
            .cloud
            .create_service_identity(&identity, &project.reference)
            .await?;
        Ok(ProvisionedIdentity {
            identity,
            reference,
        })
    }

    pub async fn create_identity_key(&self, identity: &ProvisionedIdentity) -> Result<IdentityKey> {
        tracing::info!("Creating key for {}", identity.reference.email);

        let material = self.cloud.create_key(&identity.reference).await?;
        Ok(IdentityKey {
            name: material.name,
            service_account_id: identity.reference.email.clone(),
            private_key: material.encoded,
        })
    }

    /// Inject the decoded key as `GOOGLE_APPLICATION_CREDENTIALS`
    ///
    /// The key must carry its generated material; a key without it has not
    /// been created in this run. The stored value is the decoded credentials
    /// file. Writing is an upsert keyed by variable name.
    pub async fn wire_secret(
        &self,
        repo: &ProvisionedRepository,
        key: &IdentityKey,
    ) -> Result<ProvisionedVariable> {
        if key.private_key.is_empty() {
            return Err(CloudError::PreconditionFailed(format!(
                "key {} has no generated material",
                key.name
            )));
        }

        let credentials = decode_key_material(&key.private_key)?;
        let variable = ProtectedVariable::credentials_file(credentials);

        tracing::info!(
            "Setting protected variable {} on {}",
            variable.key,
            repo.reference.path_with_namespace
        );

        let reference = self
            .source_control
            .set_protected_variable(&repo.reference, &variable)
            .await?;
        Ok(ProvisionedVariable {
            variable,
            reference,
        })
    }
}
