//! KDLパーサー
//!
//! tenantflow.kdl をパースして Manifest を生成します。

mod customer;

pub use customer::{parse_customer, parse_gitlab};

use crate::error::{FlowError, Result};
use crate::model::Manifest;
use kdl::KdlDocument;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// KDLファイルをパースしてManifestを生成
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_kdl_string(&content)
}

/// KDL文字列をパース
pub fn parse_kdl_string(content: &str) -> Result<Manifest> {
    let doc: KdlDocument = content.parse()?;

    let mut manifest = Manifest::default();
    let mut seen = HashSet::new();

    for node in doc.nodes() {
        match node.name().value() {
            "gitlab" => {
                if let Some(namespace) = parse_gitlab(node)? {
                    manifest.namespace = Some(namespace);
                }
            }
            "customer" => {
                let customer = parse_customer(node)?;
                if !seen.insert(customer.unit_name.clone()) {
                    return Err(FlowError::DuplicateCustomer(customer.unit_name));
                }
                manifest.customers.push(customer);
            }
            other => {
                tracing::warn!("Unknown top-level node ignored: {}", other);
            }
        }
    }

    Ok(manifest)
}
