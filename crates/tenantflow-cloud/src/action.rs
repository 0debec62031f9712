//! Action types for provisioning

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A planned action for one declared resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g., "gitlab:project", "gcp:service-account")
    pub resource_type: String,

    /// Stable state key of the resource
    pub resource_key: String,

    /// Unit that declared the resource
    pub unit: String,

    /// Description of the action
    pub description: String,

    /// State keys this action waits for
    pub depends_on: Vec<String>,

    /// Additional details about the action
    pub details: HashMap<String, serde_json::Value>,
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Create or overwrite a resource keyed by name
    Upsert,
    /// Already recorded as created; reused as is
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Upsert => write!(f, "upsert"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of applying actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied actions
    pub succeeded: Vec<ActionResult>,

    /// Failed actions
    pub failed: Vec<ActionResult>,

    /// Actions not attempted because an earlier action of the same unit failed
    pub skipped: Vec<ActionResult>,

    /// Resources reused from recorded state
    #[serde(default)]
    pub unchanged: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            unchanged: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn add_success(&mut self, action_id: String, message: String) {
        self.succeeded.push(ActionResult {
            action_id,
            success: true,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, action_id: String, error: String) {
        self.failed.push(ActionResult {
            action_id,
            success: false,
            message: String::new(),
            error: Some(error),
        });
    }

    pub fn add_skipped(&mut self, action_id: String, reason: String) {
        self.skipped.push(ActionResult {
            action_id,
            success: false,
            message: reason,
            error: None,
        });
    }

    pub fn add_unchanged(&mut self, action_id: String, message: String) {
        self.unchanged.push(ActionResult {
            action_id,
            success: true,
            message,
            error: None,
        });
    }

    /// Append another result (durations are not summed)
    pub fn merge(&mut self, other: ApplyResult) {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
        self.skipped.extend(other.skipped);
        self.unchanged.extend(other.unchanged);
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// ID of the action
    pub action_id: String,

    /// Whether the action succeeded
    pub success: bool,

    /// Success message, or the skip reason
    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}

/// Ordered actions to apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Actions in creation order
    pub actions: Vec<Action>,

    /// Whether any action would call a provider
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions
            .iter()
            .any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
            has_changes: false,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Get actions declared by one unit
    pub fn actions_for_unit(&self, unit: &str) -> Vec<&Action> {
        self.actions.iter().filter(|a| a.unit == unit).collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            upsert: self.actions_by_type(ActionType::Upsert).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub upsert: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to create, {} to upsert", self.create, self.upsert)?;
        if self.no_change > 0 {
            write!(f, ", {} unchanged", self.no_change)?;
        }
        Ok(())
    }
}
