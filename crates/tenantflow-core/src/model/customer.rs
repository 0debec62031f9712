//! 顧客（プロビジョニングユニット）の入力定義

use crate::identifiers::{Identifiers, derive};
use serde::{Deserialize, Serialize};

/// 顧客ごとの入力記述子
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSpec {
    /// 顧客の表示名（例: "First Customer"）
    pub display_name: String,

    /// Google Cloud 側のインフラを作成するか
    pub needs_cloud_infra: bool,

    /// GitLab のネームスペースID
    pub namespace: Option<i64>,

    /// 以前のユニット名。状態ファイル上の旧エントリを引き継ぐために使う
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl CustomerSpec {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    pub fn with_cloud_infra(mut self, needs_cloud_infra: bool) -> Self {
        self.needs_cloud_infra = needs_cloud_infra;
        self
    }

    pub fn with_namespace(mut self, namespace: Option<i64>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_alias(mut self, former_unit_name: impl Into<String>) -> Self {
        self.aliases.push(former_unit_name.into());
        self
    }
}

/// ユニット名と記述子の組
///
/// ユニット名（`SecondCustomer` など）は表示名とは別のハンドルで、
/// 識別子と状態ファイル上の論理名はすべてここから導出される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub unit_name: String,
    pub spec: CustomerSpec,
}

impl Customer {
    pub fn new(unit_name: impl Into<String>, spec: CustomerSpec) -> Self {
        Self {
            unit_name: unit_name.into(),
            spec,
        }
    }

    pub fn identifiers(&self) -> Identifiers {
        derive(&self.unit_name)
    }
}
