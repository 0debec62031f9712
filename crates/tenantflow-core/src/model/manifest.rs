//! マニフェスト（tenantflow.kdl 全体）

use super::Customer;
use serde::{Deserialize, Serialize};

/// マニフェスト全体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// `gitlab { namespace ... }` で指定された既定のネームスペース
    pub namespace: Option<i64>,

    /// 宣言順の顧客一覧。`spec.namespace` には個別の上書き値のみが入る
    pub customers: Vec<Customer>,
}

impl Manifest {
    /// 既定のネームスペースを反映したユニット一覧
    pub fn units(&self) -> Vec<Customer> {
        self.customers
            .iter()
            .map(|customer| {
                let mut customer = customer.clone();
                customer.spec.namespace = customer.spec.namespace.or(self.namespace);
                customer
            })
            .collect()
    }

    pub fn customer(&self, unit_name: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.unit_name == unit_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CustomerSpec;

    #[test]
    fn test_units_apply_default_namespace() {
        let manifest = Manifest {
            namespace: Some(1234),
            customers: vec![
                Customer::new("FirstCustomer", CustomerSpec::new("First Customer")),
                Customer::new(
                    "SecondCustomer",
                    CustomerSpec::new("Second Customer").with_namespace(Some(99)),
                ),
            ],
        };

        let units = manifest.units();
        assert_eq!(units[0].spec.namespace, Some(1234));
        assert_eq!(units[1].spec.namespace, Some(99));
    }

    #[test]
    fn test_units_without_namespace() {
        let manifest = Manifest {
            namespace: None,
            customers: vec![Customer::new("Acme", CustomerSpec::new("Acme"))],
        };

        assert_eq!(manifest.units()[0].spec.namespace, None);
        assert!(manifest.customer("Acme").is_some());
        assert!(manifest.customer("Other").is_none());
    }
}
