//! マニフェストローダー
//!
//! ファイル発見、パース、環境変数による上書きを統合

use crate::error::Result;
use crate::model::Manifest;
use crate::parser::parse_kdl_file;
use std::path::Path;
use tracing::{debug, info, instrument};

/// マニフェストを探してロード
#[instrument]
pub fn load_manifest() -> Result<Manifest> {
    let path = tenantflow_config::find_manifest_file()?;
    load_manifest_from_path(&path)
}

/// 指定されたパスからマニフェストをロード
///
/// `TENANTFLOW_GITLAB_NAMESPACE` が設定されていれば、
/// マニフェストの `gitlab.namespace` より優先する。
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_manifest_from_path(path: &Path) -> Result<Manifest> {
    debug!("Parsing manifest");
    let mut manifest = parse_kdl_file(path)?;

    if let Some(namespace) = tenantflow_config::gitlab_namespace_from_env()? {
        debug!(namespace, "GitLab namespace overridden by environment");
        manifest.namespace = Some(namespace);
    }

    info!(
        customers = manifest.customers.len(),
        namespace = ?manifest.namespace,
        "Manifest loaded successfully"
    );

    Ok(manifest)
}
