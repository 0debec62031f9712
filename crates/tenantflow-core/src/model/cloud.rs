//! Google Cloud側リソースの宣言

use super::CustomerSpec;
use crate::identifiers::Identifiers;
use serde::{Deserialize, Serialize};

/// 顧客ごとのGCPプロジェクト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudProject {
    /// プロジェクトID（slug）
    pub project_id: String,

    /// 表示名（"{表示名} Infrastructure"）
    pub name: String,
}

impl CloudProject {
    pub fn for_customer(ids: &Identifiers, spec: &CustomerSpec) -> Self {
        Self {
            project_id: ids.slug.clone(),
            name: format!("{} Infrastructure", spec.display_name),
        }
    }
}

/// プロジェクトに属するサービスアカウント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    /// アカウントID（token）
    pub account_id: String,

    pub display_name: String,

    /// 所属するGCPプロジェクトのID
    pub project_id: String,
}

impl ServiceIdentity {
    pub fn scoped_to(project: &CloudProject, ids: &Identifiers, spec: &CustomerSpec) -> Self {
        Self {
            account_id: ids.token.clone(),
            display_name: format!("Service Account for {} project", spec.display_name),
            project_id: project.project_id.clone(),
        }
    }
}

/// サービスアカウントの鍵
///
/// `private_key` はプロバイダーが返したbase64エンコード済みのまま保持する。
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityKey {
    /// 鍵のリソース名
    pub name: String,

    /// 対象サービスアカウントのメールアドレス
    pub service_account_id: String,

    pub private_key: String,
}

impl std::fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityKey")
            .field("name", &self.name)
            .field("service_account_id", &self.service_account_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}
