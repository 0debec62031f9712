//! GitLab provider for tenantflow
//!
//! Implements [`tenantflow_cloud::SourceControlProvider`] on top of the
//! GitLab v4 REST API.
//!
//! # Requirements
//!
//! - `GITLAB_TOKEN`: access token with the `api` scope
//! - `GITLAB_BASE_URL` (optional): API root, defaults to `https://gitlab.com/api/v4`
//!
//! # Example
//!
//! ```ignore
//! use tenantflow_cloud::SourceControlProvider;
//! use tenantflow_cloud_gitlab::GitLabProvider;
//!
//! let provider = GitLabProvider::from_env()?;
//! let auth = provider.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//! ```

pub mod api;
pub mod error;
pub mod provider;

pub use api::{GITLAB_API_BASE, GitLabClient, GitLabConfig};
pub use error::{GitLabError, Result};
pub use provider::GitLabProvider;
