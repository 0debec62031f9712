//! Deployment planning and apply
//!
//! A [`Deployment`] is the validated set of units plus their resource graph.
//! The [`Engine`] walks the graph in topological order: units run
//! concurrently, the resources of one unit run one after another. When a
//! resource fails, the rest of that unit is skipped and nothing is rolled
//! back; other units are unaffected.
//!
//! Resources recorded as created in [`GlobalState`] are reused instead of
//! created again, so rerunning an unchanged deployment calls no provider.
//! Entries recorded under an alias are moved to the current key first.

use crate::action::{Action, ActionType, ApplyResult, Plan};
use crate::error::{CloudError, Result};
use crate::graph::{ResourceGraph, ResourceKind, ResourceNode};
use crate::provider::{CloudProjectRef, IdentityRef, ProjectRef};
use crate::provisioner::{
    CloudInfra, CloudResources, ProvisionedCloudProject, ProvisionedIdentity,
    ProvisionedRepository, Provisioner,
};
use crate::state::{GlobalState, ResourceState, ResourceStatus};
use crate::unit::{ProvisioningUnit, build_graph};
use futures_util::future::join_all;
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;
use tenantflow_core::{
    CloudProject, Customer, IdentityKey, Manifest, ProtectedVariable, RepositoryProject,
    ServiceIdentity,
};

/// Validated units and their resource graph
#[derive(Debug, Clone)]
pub struct Deployment {
    units: Vec<ProvisioningUnit>,
    graph: ResourceGraph,
}

impl Deployment {
    /// Derive identifiers, check collisions and declare every resource
    pub fn new(customers: impl IntoIterator<Item = Customer>) -> Result<Self> {
        let units = customers
            .into_iter()
            .map(ProvisioningUnit::new)
            .collect::<Result<Vec<_>>>()?;
        let graph = build_graph(&units)?;

        tracing::debug!(
            "Declared {} resources for {} units",
            graph.len(),
            units.len()
        );
        Ok(Self { units, graph })
    }

    pub fn from_manifest(manifest: &Manifest) -> Result<Self> {
        Self::new(manifest.units())
    }

    pub fn units(&self) -> &[ProvisioningUnit] {
        &self.units
    }

    pub fn unit(&self, name: &str) -> Option<&ProvisioningUnit> {
        self.units.iter().find(|u| u.name() == name)
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn needs_cloud_infra(&self) -> bool {
        self.units.iter().any(|u| u.needs_cloud_infra())
    }

    /// Actions in creation order, as if nothing had been created yet
    pub fn plan(&self) -> Result<Plan> {
        self.plan_with_state(&GlobalState::default())
    }

    /// Actions in creation order; recorded resources become `NoOp`
    ///
    /// Call [`Deployment::adopt_aliases`] first so renamed resources are
    /// found under their current keys.
    pub fn plan_with_state(&self, state: &GlobalState) -> Result<Plan> {
        let mut actions = Vec::with_capacity(self.graph.len());

        for node in self.graph.topological_order()? {
            let unit = self.unit(&node.unit).ok_or_else(|| {
                CloudError::InvalidConfig(format!("resource {} has no unit", node.key()))
            })?;
            let reused = self.is_recorded(state, node);
            actions.push(plan_action(unit, node, &self.graph, reused)?);
        }

        Ok(Plan::new(actions))
    }

    /// Move state entries recorded under an alias to the declaring node's key
    ///
    /// Returns the `(alias, key)` pairs that moved.
    pub fn adopt_aliases(&self, state: &mut GlobalState) -> Vec<(String, String)> {
        let mut moved = Vec::new();

        for node in self.graph.nodes() {
            let key = node.key();
            for alias in &node.aliases {
                if state.adopt_alias(alias, &key) {
                    if let Some(entry) = state.resources.get_mut(&key) {
                        entry.unit = node.unit.clone();
                        entry.parent = node.parent.clone();
                    }
                    tracing::info!("Adopted {} as {}", alias, key);
                    moved.push((alias.clone(), key.clone()));
                    break;
                }
            }
        }

        moved
    }

    /// Whether `node` can be reused from `state` instead of created
    ///
    /// The node and everything it depends on must be recorded as created.
    /// Key material is never persisted, so a key is only reused while its
    /// variable is recorded too; otherwise a new key is generated and wired.
    pub fn is_recorded(&self, state: &GlobalState, node: &ResourceNode) -> bool {
        let key = node.key();
        if !is_created(state, &key) {
            return false;
        }
        if !self
            .graph
            .dependencies_of(&key)
            .into_iter()
            .all(|dep| self.is_recorded(state, dep))
        {
            return false;
        }

        match node.kind {
            ResourceKind::IdentityKey => self
                .unit(&node.unit)
                .is_some_and(|unit| is_created(state, &unit.variable_node().key())),
            _ => true,
        }
    }
}

fn is_created(state: &GlobalState, key: &str) -> bool {
    state.get_resource(key).is_some_and(|r| r.is_created())
}

fn action_type(kind: ResourceKind) -> ActionType {
    match kind {
        ResourceKind::ProtectedVariable => ActionType::Upsert,
        _ => ActionType::Create,
    }
}

fn action_id(node: &ResourceNode) -> String {
    format!("{}-{}", action_type(node.kind), node.key())
}

fn plan_action(
    unit: &ProvisioningUnit,
    node: &ResourceNode,
    graph: &ResourceGraph,
    reused: bool,
) -> Result<Action> {
    let ids = &unit.ids;
    let spec = unit.spec();
    let mut details = HashMap::new();
    if let Some(parent) = &node.parent {
        details.insert("parent".to_string(), json!(parent));
    }
    if !node.aliases.is_empty() {
        details.insert("aliases".to_string(), json!(node.aliases));
    }

    let description = match node.kind {
        ResourceKind::RepositoryProject => {
            let project = RepositoryProject::for_customer(ids, spec);
            details.insert("name".to_string(), json!(project.name));
            details.insert("description".to_string(), json!(project.description));
            details.insert("namespace_id".to_string(), json!(project.namespace_id));
            details.insert("policy".to_string(), serde_json::to_value(project.policy)?);
            format!("Create repository {}", project.name)
        }
        ResourceKind::CloudProject => {
            let project = CloudProject::for_customer(ids, spec);
            details.insert("project_id".to_string(), json!(project.project_id));
            details.insert("name".to_string(), json!(project.name));
            format!("Create cloud project {}", project.project_id)
        }
        ResourceKind::ServiceIdentity => {
            let project = CloudProject::for_customer(ids, spec);
            let identity = ServiceIdentity::scoped_to(&project, ids, spec);
            details.insert("account_id".to_string(), json!(identity.account_id));
            details.insert("display_name".to_string(), json!(identity.display_name));
            details.insert("project_id".to_string(), json!(identity.project_id));
            format!(
                "Create service account {} in {}",
                identity.account_id, identity.project_id
            )
        }
        ResourceKind::IdentityKey => {
            details.insert("service_account".to_string(), json!(ids.token));
            format!("Create key for service account {}", ids.token)
        }
        ResourceKind::ProtectedVariable => {
            let variable = ProtectedVariable::credentials_file(String::new());
            details.insert("key".to_string(), json!(variable.key));
            details.insert(
                "environment_scope".to_string(),
                json!(variable.environment_scope),
            );
            details.insert(
                "variable_type".to_string(),
                json!(variable.variable_type.to_string()),
            );
            details.insert("protected".to_string(), json!(variable.protected));
            format!("Set {} on repository {}", variable.key, ids.slug)
        }
    };

    let (planned, description) = if reused {
        (ActionType::NoOp, format!("{} (recorded)", description))
    } else {
        (action_type(node.kind), description)
    };

    Ok(Action {
        id: action_id(node),
        action_type: planned,
        resource_type: node.kind.resource_type(),
        resource_key: node.key(),
        unit: node.unit.clone(),
        description,
        depends_on: graph
            .dependencies_of(&node.key())
            .iter()
            .map(|n| n.key())
            .collect(),
        details,
    })
}

/// A failed resource and the provider error it returned
#[derive(Debug)]
pub struct ResourceError {
    pub unit: String,
    pub resource: String,
    pub error: CloudError,
}

/// Outcome of an apply
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub result: ApplyResult,

    /// At most one per unit, in unit order
    pub errors: Vec<ResourceError>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.result.is_success()
    }

    pub fn error_for(&self, unit: &str) -> Option<&CloudError> {
        self.errors
            .iter()
            .find(|e| e.unit == unit)
            .map(|e| &e.error)
    }
}

/// Outputs produced so far by one unit
#[derive(Default)]
struct UnitOutputs {
    repository: Option<ProvisionedRepository>,
    cloud_project: Option<ProvisionedCloudProject>,
    identity: Option<ProvisionedIdentity>,
    key: Option<IdentityKey>,
}

impl UnitOutputs {
    fn cloud_infra(&self) -> CloudInfra {
        match (&self.cloud_project, &self.identity, &self.key) {
            (Some(project), Some(identity), Some(key)) => CloudInfra::Present(CloudResources {
                project: project.clone(),
                identity: identity.clone(),
                key: key.clone(),
            }),
            _ => CloudInfra::Absent,
        }
    }
}

#[derive(Default)]
struct UnitRun {
    result: ApplyResult,
    created: Vec<(String, ResourceState)>,
    failure: Option<(ResourceState, ResourceError)>,
}

/// Applies deployments through a [`Provisioner`]
pub struct Engine {
    provisioner: Provisioner,
}

impl Engine {
    pub fn new(provisioner: Provisioner) -> Self {
        Self { provisioner }
    }

    pub fn provisioner(&self) -> &Provisioner {
        &self.provisioner
    }

    /// Check authentication of the providers the deployment will use
    ///
    /// The cloud provider is only checked when some unit requests cloud
    /// infrastructure.
    pub async fn preflight(&self, deployment: &Deployment) -> Result<()> {
        let source_control = self.provisioner.source_control();
        let status = source_control.check_auth().await?;
        if !status.authenticated {
            return Err(CloudError::AuthenticationFailed(format!(
                "{}: {}",
                source_control.display_name(),
                status.error.unwrap_or_default()
            )));
        }
        tracing::info!(
            "{} authenticated as {}",
            source_control.display_name(),
            status.account_info.unwrap_or_default()
        );

        if deployment.needs_cloud_infra() {
            let cloud = self.provisioner.cloud();
            let status = cloud.check_auth().await?;
            if !status.authenticated {
                return Err(CloudError::AuthenticationFailed(format!(
                    "{}: {}",
                    cloud.display_name(),
                    status.error.unwrap_or_default()
                )));
            }
            tracing::info!(
                "{} authenticated as {}",
                cloud.display_name(),
                status.account_info.unwrap_or_default()
            );
        }

        Ok(())
    }

    /// Create every declared resource and record the outcome in `state`
    ///
    /// Aliased entries are adopted first, and resources already recorded as
    /// created are reused. Returns `Err` only when the graph cannot be
    /// ordered. Provider failures are reported per unit in the returned
    /// [`ApplyReport`].
    pub async fn apply(&self, deployment: &Deployment, state: &mut GlobalState) -> Result<ApplyReport> {
        let start = Instant::now();
        let order = deployment.graph().topological_order()?;
        deployment.adopt_aliases(state);

        let runs = {
            let recorded = &*state;
            let pipelines = deployment.units().iter().map(|unit| {
                let nodes: Vec<&ResourceNode> = order
                    .iter()
                    .copied()
                    .filter(|n| n.unit == unit.name())
                    .collect();
                self.apply_unit(deployment, recorded, unit, nodes)
            });
            join_all(pipelines).await
        };

        let mut report = ApplyReport::default();
        for run in runs {
            for (key, resource) in run.created {
                state.set_resource(key, resource);
            }
            if let Some((resource, error)) = run.failure {
                // an existing entry still describes the live resource
                if state.get_resource(&error.resource).is_none() {
                    state.set_resource(error.resource.clone(), resource);
                }
                report.errors.push(error);
            }
            report.result.merge(run.result);
        }

        report.result.duration_ms =
            u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            "Apply finished: {} succeeded, {} unchanged, {} failed, {} skipped",
            report.result.succeeded.len(),
            report.result.unchanged.len(),
            report.result.failed.len(),
            report.result.skipped.len()
        );
        Ok(report)
    }

    async fn apply_unit(
        &self,
        deployment: &Deployment,
        recorded: &GlobalState,
        unit: &ProvisioningUnit,
        nodes: Vec<&ResourceNode>,
    ) -> UnitRun {
        let mut outputs = UnitOutputs::default();
        let mut run = UnitRun::default();
        let mut aborted_at: Option<String> = None;

        for node in nodes {
            let key = node.key();

            if let Some(failed) = &aborted_at {
                tracing::warn!("Skipping {}: {} failed", key, failed);
                run.result
                    .add_skipped(action_id(node), format!("{} failed", failed));
                continue;
            }

            let outcome = match recorded.get_resource(&key) {
                Some(entry) if deployment.is_recorded(recorded, node) => {
                    restore(unit, node, entry, &mut outputs).map(|()| None)
                }
                _ => self.execute(unit, node, &mut outputs).await.map(Some),
            };

            match outcome {
                Ok(None) => {
                    tracing::debug!("Reusing recorded {}", key);
                    run.result
                        .add_unchanged(action_id(node), format!("{} recorded", node.kind));
                }
                Ok(Some(resource)) => {
                    run.result.add_success(
                        action_id(node),
                        format!("{} {}", node.kind, resource.id),
                    );
                    run.created
                        .push((key, resource.with_parent(node.parent.clone())));
                }
                Err(error) => {
                    tracing::error!("Failed to create {}: {}", key, error);
                    run.result.add_failure(action_id(node), error.to_string());

                    let resource = ResourceState::new("", node.kind.resource_type(), unit.name())
                        .with_status(ResourceStatus::Failed)
                        .with_parent(node.parent.clone())
                        .with_attribute("error", json!(error.to_string()));
                    run.failure = Some((
                        resource,
                        ResourceError {
                            unit: unit.name().to_string(),
                            resource: key.clone(),
                            error,
                        },
                    ));
                    aborted_at = Some(key);
                }
            }
        }

        run
    }

    async fn execute(
        &self,
        unit: &ProvisioningUnit,
        node: &ResourceNode,
        outputs: &mut UnitOutputs,
    ) -> Result<ResourceState> {
        let ids = &unit.ids;
        let spec = unit.spec();
        let resource_type = node.kind.resource_type();

        let missing = |what: &str| {
            CloudError::PreconditionFailed(format!(
                "{} requires the {} of unit {}",
                node.key(),
                what,
                unit.name()
            ))
        };

        match node.kind {
            ResourceKind::RepositoryProject => {
                let repo = self.provisioner.provision_repository(ids, spec).await?;
                let state = ResourceState::new(repo.reference.id.to_string(), resource_type, unit.name())
                    .with_status(ResourceStatus::Created)
                    .with_attribute("name", json!(repo.project.name))
                    .with_attribute(
                        "path_with_namespace",
                        json!(repo.reference.path_with_namespace),
                    )
                    .with_attribute("namespace_id", json!(repo.project.namespace_id));
                outputs.repository = Some(repo);
                Ok(state)
            }
            ResourceKind::CloudProject => {
                let project = self.provisioner.create_cloud_project(ids, spec).await?;
                let state = ResourceState::new(
                    project.reference.project_id.clone(),
                    resource_type,
                    unit.name(),
                )
                .with_status(ResourceStatus::Created)
                .with_attribute("name", json!(project.project.name));
                outputs.cloud_project = Some(project);
                Ok(state)
            }
            ResourceKind::ServiceIdentity => {
                let project = outputs
                    .cloud_project
                    .as_ref()
                    .ok_or_else(|| missing("cloud project"))?;
                let identity = self
                    .provisioner
                    .create_service_identity(project, ids, spec)
                    .await?;
                let state = ResourceState::new(
                    identity.reference.email.clone(),
                    resource_type,
                    unit.name(),
                )
                .with_status(ResourceStatus::Created)
                .with_attribute("account_id", json!(identity.identity.account_id))
                .with_attribute("unique_id", json!(identity.reference.unique_id))
                .with_attribute("project_id", json!(identity.identity.project_id));
                outputs.identity = Some(identity);
                Ok(state)
            }
            ResourceKind::IdentityKey => {
                let identity = outputs
                    .identity
                    .as_ref()
                    .ok_or_else(|| missing("service account"))?;
                let key = self.provisioner.create_identity_key(identity).await?;
                let state = ResourceState::new(key.name.clone(), resource_type, unit.name())
                    .with_status(ResourceStatus::Created)
                    .with_attribute("service_account_id", json!(key.service_account_id));
                outputs.key = Some(key);
                Ok(state)
            }
            ResourceKind::ProtectedVariable => {
                let repo = outputs
                    .repository
                    .as_ref()
                    .ok_or_else(|| missing("repository"))?;
                let infra = outputs.cloud_infra();
                let CloudInfra::Present(resources) = &infra else {
                    return Err(missing("service account key"));
                };

                let variable = self.provisioner.wire_secret(repo, &resources.key).await?;
                Ok(
                    ResourceState::new(variable.reference.key.clone(), resource_type, unit.name())
                        .with_status(ResourceStatus::Created)
                        .with_attribute(
                            "environment_scope",
                            json!(variable.reference.environment_scope),
                        )
                        .with_attribute(
                            "variable_type",
                            json!(variable.variable.variable_type.to_string()),
                        )
                        .with_attribute("protected", json!(variable.variable.protected))
                        .with_attribute(
                            "project",
                            json!(repo.reference.path_with_namespace),
                        ),
                )
            }
        }
    }
}

/// Rebuild a unit's outputs from a recorded resource
///
/// Keys and variables carry no outputs: they are only reused together, and
/// nothing after them needs the key material.
fn restore(
    unit: &ProvisioningUnit,
    node: &ResourceNode,
    entry: &ResourceState,
    outputs: &mut UnitOutputs,
) -> Result<()> {
    let ids = &unit.ids;
    let spec = unit.spec();
    let corrupt = |what: &str| {
        CloudError::StateError(format!(
            "{} is recorded without a valid {}",
            node.key(),
            what
        ))
    };

    match node.kind {
        ResourceKind::RepositoryProject => {
            let id = entry.id.parse::<u64>().map_err(|_| corrupt("project id"))?;
            let path_with_namespace = entry
                .get_attribute::<String>("path_with_namespace")
                .ok_or_else(|| corrupt("path_with_namespace"))?;
            outputs.repository = Some(ProvisionedRepository {
                project: RepositoryProject::for_customer(ids, spec),
                reference: ProjectRef {
                    id,
                    path_with_namespace,
                },
            });
        }
        ResourceKind::CloudProject => {
            outputs.cloud_project = Some(ProvisionedCloudProject {
                project: CloudProject::for_customer(ids, spec),
                reference: CloudProjectRef {
                    project_id: entry.id.clone(),
                },
            });
        }
        ResourceKind::ServiceIdentity => {
            let project = outputs
                .cloud_project
                .as_ref()
                .ok_or_else(|| corrupt("cloud project"))?;
            outputs.identity = Some(ProvisionedIdentity {
                identity: ServiceIdentity::scoped_to(&project.project, ids, spec),
                reference: IdentityRef {
                    email: entry.id.clone(),
                    unique_id: entry.get_attribute("unique_id").unwrap_or_default(),
                },
            });
        }
        ResourceKind::IdentityKey | ResourceKind::ProtectedVariable => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantflow_core::CustomerSpec;

    fn customers() -> Vec<Customer> {
        vec![
            Customer::new(
                "FirstCustomer",
                CustomerSpec::new("First Customer").with_namespace(Some(7)),
            ),
            Customer::new(
                "SecondCustomer",
                CustomerSpec::new("Second Customer").with_cloud_infra(true),
            ),
        ]
    }

    #[test]
    fn test_plan_for_two_customers() {
        let deployment = Deployment::new(customers()).unwrap();
        let plan = deployment.plan().unwrap();

        assert_eq!(plan.actions.len(), 6);
        assert_eq!(plan.summary().create, 5);
        assert_eq!(plan.summary().upsert, 1);
        assert_eq!(plan.actions_for_unit("FirstCustomer").len(), 1);

        let repo = &plan.actions[0];
        assert_eq!(repo.resource_key, "gitlab:project:FirstCustomer");
        assert_eq!(repo.details["name"], json!("first-customer"));
        assert_eq!(repo.details["namespace_id"], json!(7));
        assert_eq!(repo.details["policy"]["merge_method"], json!("ff"));

        let variable = plan.actions.last().unwrap();
        assert_eq!(variable.action_type, ActionType::Upsert);
        assert_eq!(variable.details["key"], json!("GOOGLE_APPLICATION_CREDENTIALS"));
        assert_eq!(variable.depends_on.len(), 2);
    }

    #[test]
    fn test_plan_service_account_details() {
        let deployment = Deployment::new(customers()).unwrap();
        let plan = deployment.plan().unwrap();

        let sa = plan
            .actions
            .iter()
            .find(|a| a.resource_type == "gcp:service-account")
            .unwrap();
        assert_eq!(sa.details["account_id"], json!("secondcustomer"));
        assert_eq!(sa.details["project_id"], json!("second-customer"));
        assert_eq!(
            sa.details["display_name"],
            json!("Service Account for Second Customer project")
        );
    }

    #[test]
    fn test_deployment_rejects_collisions() {
        let result = Deployment::new(vec![
            Customer::new("FirstCustomer", CustomerSpec::new("A")),
            Customer::new("First-Customer", CustomerSpec::new("B")),
        ]);
        assert!(matches!(result, Err(CloudError::NameCollision(_))));
    }

    #[test]
    fn test_needs_cloud_infra() {
        let deployment = Deployment::new(customers()).unwrap();
        assert!(deployment.needs_cloud_infra());

        let deployment =
            Deployment::new(vec![Customer::new("Acme", CustomerSpec::new("Acme"))]).unwrap();
        assert!(!deployment.needs_cloud_infra());
    }

    fn created(deployment: &Deployment, keys: &[&str]) -> GlobalState {
        let mut state = GlobalState::new();
        for key in keys {
            let node = deployment
                .graph()
                .get(key)
                .unwrap_or_else(|| panic!("undeclared {}", key));
            state.set_resource(
                key.to_string(),
                ResourceState::new("1", node.kind.resource_type(), node.unit.clone())
                    .with_status(ResourceStatus::Created),
            );
        }
        state
    }

    #[test]
    fn test_plan_with_recorded_state_is_unchanged() {
        let deployment = Deployment::new(customers()).unwrap();
        let keys: Vec<String> = deployment.graph().nodes().map(|n| n.key()).collect();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let state = created(&deployment, &keys);

        let plan = deployment.plan_with_state(&state).unwrap();
        assert!(!plan.has_changes);
        assert_eq!(plan.summary().no_change, 6);
    }

    #[test]
    fn test_plan_recreates_dependents_of_missing_resource() {
        let deployment = Deployment::new(customers()).unwrap();
        // the cloud project failed last time; the repository exists
        let state = created(
            &deployment,
            &["gitlab:project:FirstCustomer", "gitlab:project:SecondCustomer"],
        );

        let plan = deployment.plan_with_state(&state).unwrap();
        let summary = plan.summary();
        assert_eq!(summary.no_change, 2);
        assert_eq!(summary.create, 3);
        assert_eq!(summary.upsert, 1);
    }

    #[test]
    fn test_key_without_recorded_variable_is_regenerated() {
        let deployment = Deployment::new(customers()).unwrap();
        let state = created(
            &deployment,
            &[
                "gitlab:project:SecondCustomer",
                "gcp:project:SecondCustomer",
                "gcp:service-account:ServiceAccountSecondCustomer",
                "gcp:service-account-key:ServiceAccountSecondCustomerKey",
            ],
        );

        let key = deployment
            .graph()
            .get("gcp:service-account-key:ServiceAccountSecondCustomerKey")
            .unwrap();
        assert!(!deployment.is_recorded(&state, key));

        let identity = deployment
            .graph()
            .get("gcp:service-account:ServiceAccountSecondCustomer")
            .unwrap();
        assert!(deployment.is_recorded(&state, identity));
    }

    #[test]
    fn test_adopt_aliases_moves_renamed_unit_entries() {
        let deployment = Deployment::new(vec![Customer::new(
            "SecondCustomer",
            CustomerSpec::new("Second Customer")
                .with_cloud_infra(true)
                .with_alias("Customer2"),
        )])
        .unwrap();

        let mut state = GlobalState::new();
        state.set_resource(
            "gcp:project:Customer2".to_string(),
            ResourceState::new("customer2", "gcp:project", "Customer2")
                .with_status(ResourceStatus::Created),
        );

        let moved = deployment.adopt_aliases(&mut state);
        assert_eq!(
            moved,
            vec![(
                "gcp:project:Customer2".to_string(),
                "gcp:project:SecondCustomer".to_string()
            )]
        );

        let entry = state.get_resource("gcp:project:SecondCustomer").unwrap();
        assert_eq!(entry.id, "customer2");
        assert_eq!(entry.unit, "SecondCustomer");
        assert_eq!(
            entry.parent.as_deref(),
            Some("customer:project:SecondCustomer")
        );
        assert!(state.get_resource("gcp:project:Customer2").is_none());
    }

    #[test]
    fn test_outputs_narrow_to_absent_until_complete() {
        let outputs = UnitOutputs::default();
        assert!(!outputs.cloud_infra().is_present());
    }
}
