//! Google Cloud provider for tenantflow
//!
//! Implements [`tenantflow_cloud::CloudProvider`]: projects through Resource
//! Manager, service accounts and keys through IAM.
//!
//! # Requirements
//!
//! - `GOOGLE_OAUTH_ACCESS_TOKEN`: OAuth2 access token (e.g. from
//!   `gcloud auth print-access-token`)
//! - `GOOGLE_CLOUD_ORG_ID` (optional): organization to create projects under

pub mod api;
pub mod error;
pub mod provider;

pub use api::{GcpClient, GcpConfig};
pub use error::{GcpError, Result};
pub use provider::GcpProvider;
