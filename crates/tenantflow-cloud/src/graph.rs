//! Resource dependency graph
//!
//! Every declared resource is a named node; an edge `a -> b` means `a` must be
//! created before `b`. Ordering is computed by a topological pass, with ties
//! broken by declaration order so that the same declarations always yield the
//! same order.
//!
//! A node may also name a parent (the unit component or another resource) and
//! aliases: keys it was known by before, so recorded state can follow it.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Kind of a declared resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    RepositoryProject,
    CloudProject,
    ServiceIdentity,
    IdentityKey,
    ProtectedVariable,
}

impl ResourceKind {
    /// Provider the resource belongs to
    pub fn provider(&self) -> &'static str {
        match self {
            ResourceKind::RepositoryProject | ResourceKind::ProtectedVariable => "gitlab",
            ResourceKind::CloudProject
            | ResourceKind::ServiceIdentity
            | ResourceKind::IdentityKey => "gcp",
        }
    }

    /// Provider-local resource type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::RepositoryProject => "project",
            ResourceKind::CloudProject => "project",
            ResourceKind::ServiceIdentity => "service-account",
            ResourceKind::IdentityKey => "service-account-key",
            ResourceKind::ProtectedVariable => "project-variable",
        }
    }

    /// Full resource type (e.g., "gcp:service-account")
    pub fn resource_type(&self) -> String {
        format!("{}:{}", self.provider(), self.type_name())
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.provider(), self.type_name())
    }
}

/// A named node in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Logical name (e.g., "ServiceAccountSecondCustomer")
    pub name: String,

    pub kind: ResourceKind,

    /// Unit that declared this node
    pub unit: String,

    /// Key of the owning component or resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Previous keys of this resource
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ResourceNode {
    pub fn new(name: impl Into<String>, kind: ResourceKind, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            unit: unit.into(),
            parent: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_alias(mut self, key: impl Into<String>) -> Self {
        self.aliases.push(key.into());
        self
    }

    /// Stable state key (provider:type:name)
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }
}

/// Directed acyclic graph of declared resources
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    index: HashMap<String, usize>,
    /// Alias key -> node claiming it
    alias_index: HashMap<String, usize>,
    /// Outgoing edges: dependency -> dependents
    dependents: Vec<Vec<usize>>,
    /// Incoming edges: dependent -> dependencies
    dependencies: Vec<Vec<usize>>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Declare a node. Returns its key.
    ///
    /// A key or alias may belong to one node only, whether it is claimed as a
    /// key or as an alias.
    pub fn add_node(&mut self, node: ResourceNode) -> Result<String> {
        let key = node.key();
        if self.index.contains_key(&key) {
            return Err(CloudError::NameCollision(format!(
                "resource {} is declared more than once",
                key
            )));
        }
        if let Some(&owner) = self.alias_index.get(&key) {
            return Err(CloudError::NameCollision(format!(
                "resource {} is already an alias of {}",
                key,
                self.nodes[owner].key()
            )));
        }
        for alias in &node.aliases {
            if *alias == key || self.index.contains_key(alias) {
                return Err(CloudError::NameCollision(format!(
                    "alias {} of {} names a declared resource",
                    alias, key
                )));
            }
            if let Some(&owner) = self.alias_index.get(alias) {
                return Err(CloudError::NameCollision(format!(
                    "alias {} is claimed by both {} and {}",
                    alias,
                    self.nodes[owner].key(),
                    key
                )));
            }
        }

        let idx = self.nodes.len();
        self.index.insert(key.clone(), idx);
        for alias in &node.aliases {
            self.alias_index.insert(alias.clone(), idx);
        }
        self.nodes.push(node);
        self.dependents.push(Vec::new());
        self.dependencies.push(Vec::new());
        Ok(key)
    }

    /// Declare that `dependency` must exist before `dependent`
    pub fn add_edge(&mut self, dependency: &str, dependent: &str) -> Result<()> {
        let from = self.lookup(dependency)?;
        let to = self.lookup(dependent)?;

        if from == to {
            return Err(CloudError::CircularDependency(dependency.to_string()));
        }
        if !self.dependents[from].contains(&to) {
            self.dependents[from].push(to);
            self.dependencies[to].push(from);
        }
        Ok(())
    }

    fn lookup(&self, key: &str) -> Result<usize> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| CloudError::InvalidConfig(format!("unknown resource: {}", key)))
    }

    pub fn get(&self, key: &str) -> Option<&ResourceNode> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    /// Nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter()
    }

    /// Direct dependencies of a node
    pub fn dependencies_of(&self, key: &str) -> Vec<&ResourceNode> {
        match self.index.get(key) {
            Some(&i) => self.dependencies[i].iter().map(|&d| &self.nodes[d]).collect(),
            None => Vec::new(),
        }
    }

    /// Creation order (Kahn's algorithm)
    pub fn topological_order(&self) -> Result<Vec<&ResourceNode>> {
        let mut in_degree: Vec<usize> = self.dependencies.iter().map(|d| d.len()).collect();
        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(idx) = ready.pop_first() {
            order.push(&self.nodes[idx]);
            for &next in &self.dependents[idx] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.insert(next);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let remaining: Vec<String> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, d)| **d > 0)
                .map(|(i, _)| self.nodes[i].key())
                .collect();
            return Err(CloudError::CircularDependency(remaining.join(", ")));
        }

        tracing::debug!("Resolved creation order for {} resources", order.len());
        Ok(order)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, kind: ResourceKind) -> ResourceNode {
        ResourceNode::new(name, kind, "Unit")
    }

    fn names(order: &[&ResourceNode]) -> Vec<String> {
        order.iter().map(|n| n.name.clone()).collect()
    }

    #[test]
    fn test_node_key() {
        let n = node("ServiceAccountAcme", ResourceKind::ServiceIdentity);
        assert_eq!(n.key(), "gcp:service-account:ServiceAccountAcme");
        assert_eq!(
            ResourceKind::ProtectedVariable.resource_type(),
            "gitlab:project-variable"
        );
    }

    #[test]
    fn test_topological_order_follows_edges() {
        let mut graph = ResourceGraph::new();
        // declared in reverse to make sure edges, not declaration order, win
        let var = graph.add_node(node("V", ResourceKind::ProtectedVariable)).unwrap();
        let key = graph.add_node(node("K", ResourceKind::IdentityKey)).unwrap();
        let sa = graph.add_node(node("S", ResourceKind::ServiceIdentity)).unwrap();
        let cp = graph.add_node(node("C", ResourceKind::CloudProject)).unwrap();
        let repo = graph.add_node(node("R", ResourceKind::RepositoryProject)).unwrap();

        graph.add_edge(&cp, &sa).unwrap();
        graph.add_edge(&sa, &key).unwrap();
        graph.add_edge(&key, &var).unwrap();
        graph.add_edge(&repo, &var).unwrap();

        let order = names(&graph.topological_order().unwrap());
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("C") < pos("S"));
        assert!(pos("S") < pos("K"));
        assert!(pos("K") < pos("V"));
        assert!(pos("R") < pos("V"));
    }

    #[test]
    fn test_topological_order_ties_use_declaration_order() {
        let mut graph = ResourceGraph::new();
        graph.add_node(node("B", ResourceKind::RepositoryProject)).unwrap();
        graph.add_node(node("A", ResourceKind::CloudProject)).unwrap();
        graph.add_node(node("C", ResourceKind::IdentityKey)).unwrap();

        let order = names(&graph.topological_order().unwrap());
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_alias_collisions() {
        let mut graph = ResourceGraph::new();
        graph
            .add_node(node("New", ResourceKind::CloudProject).with_alias("gcp:project:Old"))
            .unwrap();

        // an alias cannot be reclaimed, nor declared as a live resource
        assert!(matches!(
            graph.add_node(node("Other", ResourceKind::CloudProject).with_alias("gcp:project:Old")),
            Err(CloudError::NameCollision(_))
        ));
        assert!(matches!(
            graph.add_node(node("Old", ResourceKind::CloudProject)),
            Err(CloudError::NameCollision(_))
        ));
        assert!(matches!(
            graph.add_node(node("Next", ResourceKind::CloudProject).with_alias("gcp:project:New")),
            Err(CloudError::NameCollision(_))
        ));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut graph = ResourceGraph::new();
        let a = graph.add_node(node("A", ResourceKind::CloudProject)).unwrap();
        let b = graph.add_node(node("B", ResourceKind::ServiceIdentity)).unwrap();
        graph.add_edge(&a, &b).unwrap();
        graph.add_edge(&b, &a).unwrap();

        assert!(matches!(
            graph.topological_order(),
            Err(CloudError::CircularDependency(_))
        ));
    }

    #[test]
    fn test_self_edge_is_rejected() {
        let mut graph = ResourceGraph::new();
        let a = graph.add_node(node("A", ResourceKind::CloudProject)).unwrap();
        assert!(matches!(
            graph.add_edge(&a, &a),
            Err(CloudError::CircularDependency(_))
        ));
    }

    #[test]
    fn test_duplicate_node_is_name_collision() {
        let mut graph = ResourceGraph::new();
        graph.add_node(node("A", ResourceKind::CloudProject)).unwrap();
        assert!(matches!(
            graph.add_node(node("A", ResourceKind::CloudProject)),
            Err(CloudError::NameCollision(_))
        ));
        // same name, different kind is a different resource
        assert!(graph.add_node(node("A", ResourceKind::RepositoryProject)).is_ok());
    }

    #[test]
    fn test_unknown_edge_endpoint() {
        let mut graph = ResourceGraph::new();
        let a = graph.add_node(node("A", ResourceKind::CloudProject)).unwrap();
        assert!(matches!(
            graph.add_edge(&a, "gcp:project:Missing"),
            Err(CloudError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_dependencies_of() {
        let mut graph = ResourceGraph::new();
        let repo = graph.add_node(node("R", ResourceKind::RepositoryProject)).unwrap();
        let key = graph.add_node(node("K", ResourceKind::IdentityKey)).unwrap();
        let var = graph.add_node(node("V", ResourceKind::ProtectedVariable)).unwrap();
        graph.add_edge(&repo, &var).unwrap();
        graph.add_edge(&key, &var).unwrap();

        let deps: Vec<_> = graph.dependencies_of(&var).iter().map(|n| n.key()).collect();
        assert_eq!(deps, vec![repo, key]);
        assert!(graph.dependencies_of("nope").is_empty());
    }
}
