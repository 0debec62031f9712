//! tenantflow provisioning
//!
//! Turns customer units into a graph of provider resources and applies it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 tenantflow CLI                  │
//! │                 (plan / up)                     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                tenantflow-cloud                 │
//! │  ┌──────────────┐  ┌──────────────┐             │
//! │  │ Unit / Graph │  │    Engine    │             │
//! │  └──────────────┘  └──────────────┘             │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait SourceControlProvider { ... }     │   │
//! │  │  trait CloudProvider { ... }             │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐                               │
//! │  │  State Mgmt  │                               │
//! │  └──────────────┘                               │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │    gitlab     │ │      gcp      │
//! │   provider    │ │   provider    │
//! └───────────────┘ └───────────────┘
//! ```

pub mod action;
pub mod engine;
pub mod error;
pub mod graph;
pub mod provider;
pub mod provisioner;
pub mod secret;
pub mod state;
pub mod unit;

pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use engine::{ApplyReport, Deployment, Engine, ResourceError};
pub use error::{CloudError, Result};
pub use graph::{ResourceGraph, ResourceKind, ResourceNode};
pub use provider::{
    AuthStatus, CloudProjectRef, CloudProvider, IdentityRef, KeyMaterial, ProjectRef,
    RetryConfig, SourceControlProvider, VariableRef,
};
pub use provisioner::{
    CloudInfra, CloudResources, ProvisionedCloudProject, ProvisionedIdentity,
    ProvisionedRepository, ProvisionedVariable, Provisioner,
};
pub use secret::decode_key_material;
pub use state::{GlobalState, ResourceState, ResourceStatus, StateLock, StateManager};
pub use unit::{ProvisioningUnit, build_graph, check_collisions};
