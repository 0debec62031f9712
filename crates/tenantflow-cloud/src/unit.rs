//! Provisioning units
//!
//! One unit per customer. A unit derives its identifiers once, names every
//! resource it may declare, and adds those resources and their edges to a
//! [`ResourceGraph`].

use crate::error::{CloudError, Result};
use crate::graph::{ResourceGraph, ResourceKind, ResourceNode};
use std::collections::HashMap;
use tenantflow_core::{Customer, CustomerSpec, Identifiers};

/// A customer together with its derived identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningUnit {
    pub customer: Customer,
    pub ids: Identifiers,
}

impl ProvisioningUnit {
    /// Derive identifiers and validate them
    ///
    /// An empty unit name derives empty identifiers, which can never name a
    /// project, so the unit is rejected here before anything is declared.
    pub fn new(customer: Customer) -> Result<Self> {
        let ids = customer.identifiers();
        if ids.is_empty() {
            return Err(CloudError::InvalidConfig(format!(
                "unit name '{}' derives an empty identifier",
                customer.unit_name
            )));
        }
        Ok(Self { customer, ids })
    }

    pub fn name(&self) -> &str {
        &self.customer.unit_name
    }

    pub fn spec(&self) -> &CustomerSpec {
        &self.customer.spec
    }

    pub fn needs_cloud_infra(&self) -> bool {
        self.customer.spec.needs_cloud_infra
    }

    /// Key of the component that owns this unit's resources
    pub fn component(&self) -> String {
        component_key(self.name())
    }

    pub fn repository_node(&self) -> ResourceNode {
        self.node(ResourceKind::RepositoryProject)
    }

    pub fn cloud_project_node(&self) -> ResourceNode {
        self.node(ResourceKind::CloudProject)
    }

    pub fn service_identity_node(&self) -> ResourceNode {
        self.node(ResourceKind::ServiceIdentity)
    }

    pub fn identity_key_node(&self) -> ResourceNode {
        self.node(ResourceKind::IdentityKey)
    }

    pub fn variable_node(&self) -> ResourceNode {
        self.node(ResourceKind::ProtectedVariable)
    }

    /// Build a node with its parent and one alias per former unit name
    ///
    /// The key hangs off its service account and the variable off its
    /// repository; everything else belongs to the unit component.
    fn node(&self, kind: ResourceKind) -> ResourceNode {
        let parent = match kind {
            ResourceKind::IdentityKey => unit_key(self.name(), ResourceKind::ServiceIdentity),
            ResourceKind::ProtectedVariable => {
                unit_key(self.name(), ResourceKind::RepositoryProject)
            }
            _ => self.component(),
        };

        self.spec().aliases.iter().fold(
            ResourceNode::new(logical_name(self.name(), kind), kind, self.name())
                .with_parent(parent),
            |node, former| node.with_alias(unit_key(former, kind)),
        )
    }

    /// Add this unit's resources and edges to the graph
    pub fn declare(&self, graph: &mut ResourceGraph) -> Result<()> {
        let repo = graph.add_node(self.repository_node())?;

        if !self.needs_cloud_infra() {
            return Ok(());
        }

        let project = graph.add_node(self.cloud_project_node())?;
        let identity = graph.add_node(self.service_identity_node())?;
        let key = graph.add_node(self.identity_key_node())?;
        let variable = graph.add_node(self.variable_node())?;

        graph.add_edge(&project, &identity)?;
        graph.add_edge(&identity, &key)?;
        graph.add_edge(&key, &variable)?;
        graph.add_edge(&repo, &variable)?;
        Ok(())
    }
}

/// Logical resource name for a unit (e.g., "ServiceAccount{Unit}Key")
fn logical_name(unit: &str, kind: ResourceKind) -> String {
    match kind {
        ResourceKind::RepositoryProject | ResourceKind::CloudProject => unit.to_string(),
        ResourceKind::ServiceIdentity => format!("ServiceAccount{}", unit),
        ResourceKind::IdentityKey => format!("ServiceAccount{}Key", unit),
        ResourceKind::ProtectedVariable => format!("{}GCPAccess", unit),
    }
}

fn unit_key(unit: &str, kind: ResourceKind) -> String {
    ResourceNode::new(logical_name(unit, kind), kind, unit).key()
}

fn component_key(unit: &str) -> String {
    format!("customer:project:{}", unit)
}

/// Reject units whose derived identifiers would collide
///
/// Slugs name both the GitLab project and the GCP project, so they must be
/// unique across all units. Tokens name service accounts and must be unique
/// across units that request cloud infrastructure.
pub fn check_collisions(units: &[ProvisioningUnit]) -> Result<()> {
    let mut slugs: HashMap<&str, &str> = HashMap::new();
    let mut tokens: HashMap<&str, &str> = HashMap::new();

    for unit in units {
        if let Some(other) = slugs.insert(&unit.ids.slug, unit.name()) {
            return Err(CloudError::NameCollision(format!(
                "units '{}' and '{}' both derive slug '{}'",
                other,
                unit.name(),
                unit.ids.slug
            )));
        }

        if unit.needs_cloud_infra()
            && let Some(other) = tokens.insert(&unit.ids.token, unit.name())
        {
            return Err(CloudError::NameCollision(format!(
                "units '{}' and '{}' both derive service account id '{}'",
                other,
                unit.name(),
                unit.ids.token
            )));
        }
    }

    Ok(())
}

/// Validate all units and declare them into one graph
pub fn build_graph(units: &[ProvisioningUnit]) -> Result<ResourceGraph> {
    check_collisions(units)?;

    let mut graph = ResourceGraph::new();
    for unit in units {
        unit.declare(&mut graph)?;
    }
    Ok(graph)
}
