//! Provisioned resource state
//!
//! Tracks what a run created in `.tenantflow/state.json`, keyed by the
//! resource's stable key (`provider:type:logical-name`). Secret values are
//! never written here.

use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".tenantflow";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// All tracked resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    pub version: u32,

    pub updated_at: DateTime<Utc>,

    /// Resources indexed by provider:type:name
    pub resources: BTreeMap<String, ResourceState>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources declared by one unit
    pub fn unit_resources(&self, unit: &str) -> Vec<(&String, &ResourceState)> {
        self.resources
            .iter()
            .filter(|(_, r)| r.unit == unit)
            .collect()
    }

    /// Resources of one provider ("gitlab", "gcp")
    pub fn provider_resources(&self, provider: &str) -> Vec<(&String, &ResourceState)> {
        let prefix = format!("{}:", provider);
        self.resources
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .collect()
    }

    /// Insert or update a resource
    ///
    /// An existing entry keeps its original `created_at`.
    pub fn set_resource(&mut self, key: String, mut state: ResourceState) {
        if let Some(existing) = self.resources.get(&key) {
            state.created_at = existing.created_at;
        }
        self.resources.insert(key, state);
        self.updated_at = Utc::now();
    }

    pub fn remove_resource(&mut self, key: &str) -> Option<ResourceState> {
        let result = self.resources.remove(key);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    pub fn get_resource(&self, key: &str) -> Option<&ResourceState> {
        self.resources.get(key)
    }

    /// Move the entry recorded under `alias` to `key`
    ///
    /// Does nothing when `key` already has an entry or `alias` has none.
    /// Returns whether an entry moved.
    pub fn adopt_alias(&mut self, alias: &str, key: &str) -> bool {
        if self.resources.contains_key(key) {
            return false;
        }
        match self.resources.remove(alias) {
            Some(entry) => {
                self.resources.insert(key.to_string(), entry);
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

/// State of a single resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Provider-side identifier (project id, account email, key name)
    pub id: String,

    pub resource_type: String,

    /// Unit that declared the resource
    pub unit: String,

    pub status: ResourceStatus,

    /// Key of the owning component or resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Non-secret attributes reported by the provider
    pub attributes: BTreeMap<String, serde_json::Value>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            unit: unit.into(),
            status: ResourceStatus::Unknown,
            parent: None,
            attributes: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_parent(mut self, parent: Option<String>) -> Self {
        self.parent = parent;
        self
    }

    /// Whether the resource exists on the provider
    pub fn is_created(&self) -> bool {
        self.status == ResourceStatus::Created
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Resource exists on the provider
    Created,
    /// Last attempt to create the resource failed
    Failed,
    Unknown,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Created => write!(f, "created"),
            ResourceStatus::Failed => write!(f, "failed"),
            ResourceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Reads and writes the state directory
pub struct StateManager {
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !fs::try_exists(&dir).await? {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the current state, or an empty one if none was saved yet
    pub async fn load(&self) -> Result<GlobalState> {
        let path = self.state_path();
        if !fs::try_exists(&path).await? {
            tracing::debug!("State file not found, returning empty state");
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: GlobalState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    /// Save the state, keeping the previous file as a backup
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        if fs::try_exists(&path).await? {
            fs::copy(&path, self.backup_path()).await?;
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }

    /// Acquire a lock for exclusive access
    ///
    /// A lock older than one hour is treated as stale and replaced.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();
        if fs::try_exists(&lock_path).await? {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < 1 {
                return Err(CloudError::LockError(format!(
                    "State is locked by {} since {}",
                    lock_info.holder, lock_info.acquired_at
                )));
            }

            tracing::warn!("Removing stale lock from {}", lock_info.holder);
        }

        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            acquired_at: Utc::now(),
        };
        fs::write(&lock_path, serde_json::to_string_pretty(&lock_info)?).await?;

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// Guard for the state lock; removes the lock file when dropped
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if fs::try_exists(&self.lock_path).await? {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn repo_state(id: &str) -> ResourceState {
        ResourceState::new(id, "gitlab:project", "FirstCustomer")
            .with_status(ResourceStatus::Created)
            .with_attribute("path_with_namespace", serde_json::json!("acme/first-customer"))
    }

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = GlobalState::new();
        state.set_resource("gitlab:project:FirstCustomer".to_string(), repo_state("42"));
        manager.save(&state).await.unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.resources.len(), 1);
        let repo = loaded.get_resource("gitlab:project:FirstCustomer").unwrap();
        assert_eq!(repo.id, "42");
        assert_eq!(
            repo.get_attribute::<String>("path_with_namespace").as_deref(),
            Some("acme/first-customer")
        );
    }

    #[tokio::test]
    async fn test_empty_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = manager.load().await.unwrap();
        assert!(state.resources.is_empty());
    }

    #[tokio::test]
    async fn test_save_keeps_backup() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        manager.save(&GlobalState::new()).await.unwrap();
        manager.save(&GlobalState::new()).await.unwrap();

        assert!(manager.state_dir().join(STATE_BACKUP).exists());
    }

    #[tokio::test]
    async fn test_newer_version_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = GlobalState::new();
        state.version = STATE_VERSION + 1;
        manager.save(&state).await.unwrap();

        assert!(matches!(
            manager.load().await,
            Err(CloudError::StateError(_))
        ));
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let lock = manager.acquire_lock().await.unwrap();
        assert!(matches!(
            manager.acquire_lock().await,
            Err(CloudError::LockError(_))
        ));

        lock.release().await.unwrap();
        let again = manager.acquire_lock().await.unwrap();
        drop(again);
        assert!(!manager.state_dir().join(LOCK_FILE).exists());
    }

    #[test]
    fn test_set_resource_is_upsert() {
        let mut state = GlobalState::new();
        let first = repo_state("42");
        let created_at = first.created_at;
        state.set_resource("gitlab:project:FirstCustomer".to_string(), first);
        state.set_resource("gitlab:project:FirstCustomer".to_string(), repo_state("43"));

        assert_eq!(state.resources.len(), 1);
        let repo = state.get_resource("gitlab:project:FirstCustomer").unwrap();
        assert_eq!(repo.id, "43");
        assert_eq!(repo.created_at, created_at);
    }

    #[test]
    fn test_filter_by_unit_and_provider() {
        let mut state = GlobalState::new();
        state.set_resource("gitlab:project:FirstCustomer".to_string(), repo_state("1"));
        state.set_resource(
            "gcp:project:SecondCustomer".to_string(),
            ResourceState::new("second-customer", "gcp:project", "SecondCustomer"),
        );

        assert_eq!(state.unit_resources("FirstCustomer").len(), 1);
        assert_eq!(state.provider_resources("gcp").len(), 1);
        assert_eq!(state.provider_resources("gitlab").len(), 1);
    }

    #[test]
    fn test_adopt_alias_moves_entry() {
        let mut state = GlobalState::new();
        state.set_resource("gitlab:project:Customer2".to_string(), repo_state("42"));

        assert!(state.adopt_alias("gitlab:project:Customer2", "gitlab:project:FirstCustomer"));
        assert!(state.get_resource("gitlab:project:Customer2").is_none());
        assert_eq!(
            state.get_resource("gitlab:project:FirstCustomer").unwrap().id,
            "42"
        );

        // nothing left under the alias
        assert!(!state.adopt_alias("gitlab:project:Customer2", "gitlab:project:FirstCustomer"));
    }

    #[test]
    fn test_adopt_alias_keeps_existing_entry() {
        let mut state = GlobalState::new();
        state.set_resource("gitlab:project:Customer2".to_string(), repo_state("1"));
        state.set_resource("gitlab:project:FirstCustomer".to_string(), repo_state("2"));

        assert!(!state.adopt_alias("gitlab:project:Customer2", "gitlab:project:FirstCustomer"));
        assert_eq!(state.resources.len(), 2);
        assert_eq!(
            state.get_resource("gitlab:project:FirstCustomer").unwrap().id,
            "2"
        );
    }
}
