use async_trait::async_trait;
use base64::Engine as _;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tenantflow_cloud::{
    AuthStatus, CloudError, CloudProjectRef, CloudProvider, IdentityRef, KeyMaterial,
    ProjectRef, Provisioner, Result, SourceControlProvider, VariableRef,
};
use tenantflow_core::{CloudProject, ProtectedVariable, RepositoryProject, ServiceIdentity};

pub fn credentials_for(project_id: &str) -> String {
    format!(
        r#"{{"type":"service_account","project_id":"{}"}}"#,
        project_id
    )
}

#[derive(Debug, Clone)]
pub struct StoredProject {
    pub id: u64,
    pub project: RepositoryProject,
}

#[derive(Debug, Clone)]
pub struct StoredVariable {
    pub value: String,
    pub protected: bool,
    pub variable_type: String,
    pub writes: usize,
}

/// In-memory GitLab
#[derive(Default)]
pub struct FakeGitLab {
    pub projects: Mutex<Vec<StoredProject>>,
    /// (project id, key, scope) -> variable
    pub variables: Mutex<BTreeMap<(u64, String, String), StoredVariable>>,
    pub fail_variables: Mutex<bool>,
    pub authenticated: Mutex<bool>,
}

impl FakeGitLab {
    pub fn new() -> Arc<Self> {
        let fake = Self::default();
        *fake.authenticated.lock().unwrap() = true;
        Arc::new(fake)
    }

    pub fn project_count(&self) -> usize {
        self.projects.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn project(&self, name: &str) -> Option<StoredProject> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.project.name == name)
            .cloned()
    }

    #[allow(dead_code)]
    pub fn variable(&self, project_name: &str, key: &str) -> Option<StoredVariable> {
        let id = self.project(project_name)?.id;
        self.variables
            .lock()
            .unwrap()
            .get(&(id, key.to_string(), "*".to_string()))
            .cloned()
    }

    #[allow(dead_code)]
    pub fn variable_count(&self) -> usize {
        self.variables.lock().unwrap().len()
    }
}

#[async_trait]
impl SourceControlProvider for FakeGitLab {
    fn name(&self) -> &str {
        "gitlab"
    }

    fn display_name(&self) -> &str {
        "GitLab"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        if *self.authenticated.lock().unwrap() {
            Ok(AuthStatus::ok("tester"))
        } else {
            Ok(AuthStatus::failed("401 Unauthorized"))
        }
    }

    async fn create_project(&self, project: &RepositoryProject) -> Result<ProjectRef> {
        let mut projects = self.projects.lock().unwrap();
        if projects.iter().any(|p| {
            p.project.name == project.name && p.project.namespace_id == project.namespace_id
        }) {
            return Err(CloudError::creation_failed(
                format!("gitlab project {}", project.name),
                "has already been taken",
            ));
        }

        let id = projects.len() as u64 + 100;
        projects.push(StoredProject {
            id,
            project: project.clone(),
        });
        Ok(ProjectRef {
            id,
            path_with_namespace: format!("customers/{}", project.name),
        })
    }

    async fn set_protected_variable(
        &self,
        project: &ProjectRef,
        variable: &ProtectedVariable,
    ) -> Result<VariableRef> {
        if *self.fail_variables.lock().unwrap() {
            return Err(CloudError::creation_failed(
                format!("variable {}", variable.key),
                "500 Internal Server Error",
            ));
        }

        let mut variables = self.variables.lock().unwrap();
        let entry_key = (
            project.id,
            variable.key.clone(),
            variable.environment_scope.clone(),
        );
        let writes = variables.get(&entry_key).map(|v| v.writes).unwrap_or(0) + 1;
        variables.insert(
            entry_key,
            StoredVariable {
                value: variable.value.clone(),
                protected: variable.protected,
                variable_type: variable.variable_type.to_string(),
                writes,
            },
        );

        Ok(VariableRef {
            key: variable.key.clone(),
            environment_scope: variable.environment_scope.clone(),
        })
    }
}

/// In-memory Google Cloud
#[derive(Default)]
pub struct FakeGcp {
    pub projects: Mutex<Vec<CloudProject>>,
    pub service_accounts: Mutex<Vec<ServiceIdentity>>,
    pub keys: Mutex<Vec<String>>,
    /// Operations that fail: "project", "service_account", "key"
    pub failing: Mutex<HashSet<&'static str>>,
    /// Return key material that is not valid base64
    pub corrupt_keys: Mutex<bool>,
    pub authenticated: Mutex<bool>,
}

impl FakeGcp {
    pub fn new() -> Arc<Self> {
        let fake = Self::default();
        *fake.authenticated.lock().unwrap() = true;
        Arc::new(fake)
    }

    #[allow(dead_code)]
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    #[allow(dead_code)]
    pub fn recover(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn check_failure(&self, operation: &'static str, resource: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(operation) {
            return Err(CloudError::creation_failed(resource, "403 Forbidden"));
        }
        Ok(())
    }

    pub fn resource_count(&self) -> usize {
        self.projects.lock().unwrap().len()
            + self.service_accounts.lock().unwrap().len()
            + self.keys.lock().unwrap().len()
    }
}

#[async_trait]
impl CloudProvider for FakeGcp {
    fn name(&self) -> &str {
        "gcp"
    }

    fn display_name(&self) -> &str {
        "Google Cloud"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        if *self.authenticated.lock().unwrap() {
            Ok(AuthStatus::ok("tester@example.com"))
        } else {
            Ok(AuthStatus::failed("invalid token"))
        }
    }

    async fn create_project(&self, project: &CloudProject) -> Result<CloudProjectRef> {
        let resource = format!("gcp project {}", project.project_id);
        self.check_failure("project", &resource)?;

        let mut projects = self.projects.lock().unwrap();
        if projects.iter().any(|p| p.project_id == project.project_id) {
            return Err(CloudError::creation_failed(resource, "409 already exists"));
        }
        projects.push(project.clone());
        Ok(CloudProjectRef {
            project_id: project.project_id.clone(),
        })
    }

    async fn create_service_identity(
        &self,
        identity: &ServiceIdentity,
        project: &CloudProjectRef,
    ) -> Result<IdentityRef> {
        self.check_failure(
            "service_account",
            &format!("service account {}", identity.account_id),
        )?;

        self.service_accounts.lock().unwrap().push(identity.clone());
        Ok(IdentityRef {
            email: format!(
                "{}@{}.iam.gserviceaccount.com",
                identity.account_id, project.project_id
            ),
            unique_id: "1234567890".to_string(),
        })
    }

    async fn create_key(&self, identity: &IdentityRef) -> Result<KeyMaterial> {
        self.check_failure("key", &format!("key for {}", identity.email))?;

        let project_id = identity
            .email
            .split('@')
            .nth(1)
            .and_then(|d| d.split('.').next())
            .unwrap_or_default()
            .to_string();

        let mut keys = self.keys.lock().unwrap();
        let name = format!(
            "projects/{}/serviceAccounts/{}/keys/k{}",
            project_id,
            identity.email,
            keys.len()
        );
        keys.push(name.clone());

        let encoded = if *self.corrupt_keys.lock().unwrap() {
            "%%%not-base64%%%".to_string()
        } else {
            base64::engine::general_purpose::STANDARD.encode(credentials_for(&project_id))
        };
        Ok(KeyMaterial { name, encoded })
    }
}

pub fn provisioner(gitlab: &Arc<FakeGitLab>, gcp: &Arc<FakeGcp>) -> Provisioner {
    Provisioner::new(gitlab.clone(), gcp.clone())
}
