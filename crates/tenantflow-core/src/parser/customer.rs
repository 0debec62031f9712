//! customer / gitlab ノードのパース

use crate::error::{FlowError, Result};
use crate::model::{Customer, CustomerSpec};
use kdl::KdlNode;

/// 最初の引数を整数のネームスペースIDとして取り出す
fn namespace_arg(node: &KdlNode) -> Result<i64> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_integer())
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(|| FlowError::InvalidConfig("namespace requires an integer id".to_string()))
}

/// gitlab ノードをパースし、既定のネームスペースを返す
pub fn parse_gitlab(node: &KdlNode) -> Result<Option<i64>> {
    let mut namespace = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "namespace" | "namespace_id" | "namespace-id" => {
                    namespace = Some(namespace_arg(child)?);
                }
                other => {
                    tracing::warn!("Unknown gitlab setting ignored: {}", other);
                }
            }
        }
    }

    Ok(namespace)
}

/// customer ノードをパース
///
/// ```text
/// customer "SecondCustomer" {
///     name "Second Customer"
///     cloud-infra #true
///     namespace 99
///     aliases "OldCustomer"
/// }
/// ```
pub fn parse_customer(node: &KdlNode) -> Result<Customer> {
    let unit_name = node
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| FlowError::InvalidConfig("customer requires a unit name".to_string()))?
        .to_string();

    let mut display_name: Option<String> = None;
    let mut spec = CustomerSpec::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "name" | "display_name" | "display-name" => {
                    display_name = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                "cloud_infra" | "cloud-infra" => {
                    spec.needs_cloud_infra = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_bool())
                        .ok_or_else(|| {
                            FlowError::InvalidConfig(format!(
                                "customer '{}': cloud-infra requires #true or #false",
                                unit_name
                            ))
                        })?;
                }
                "namespace" | "namespace_id" | "namespace-id" => {
                    spec.namespace = Some(namespace_arg(child)?);
                }
                "alias" | "aliases" => {
                    for entry in child.entries() {
                        let alias = entry.value().as_string().ok_or_else(|| {
                            FlowError::InvalidConfig(format!(
                                "customer '{}': aliases must be unit names",
                                unit_name
                            ))
                        })?;
                        if alias == unit_name {
                            return Err(FlowError::InvalidConfig(format!(
                                "customer '{}' cannot alias itself",
                                unit_name
                            )));
                        }
                        spec.aliases.push(alias.to_string());
                    }
                }
                other => {
                    tracing::warn!("Unknown customer setting ignored in '{}': {}", unit_name, other);
                }
            }
        }
    }

    spec.display_name = display_name.ok_or_else(|| {
        FlowError::InvalidConfig(format!("customer '{}' requires a name", unit_name))
    })?;

    Ok(Customer::new(unit_name, spec))
}
