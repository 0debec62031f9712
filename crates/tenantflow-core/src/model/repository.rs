//! GitLabプロジェクトの宣言

use super::CustomerSpec;
use crate::identifiers::Identifiers;
use serde::Serialize;

/// プロジェクトの公開範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Internal,
    Public,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Private => write!(f, "private"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Public => write!(f, "public"),
        }
    }
}

/// マージ方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeMethod {
    #[serde(rename = "merge")]
    Merge,
    #[serde(rename = "rebase_merge")]
    RebaseMerge,
    #[serde(rename = "ff")]
    FastForward,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeMethod::Merge => write!(f, "merge"),
            MergeMethod::RebaseMerge => write!(f, "rebase_merge"),
            MergeMethod::FastForward => write!(f, "ff"),
        }
    }
}

/// 顧客リポジトリに適用するポリシー
///
/// 呼び出しごとに変更できない固定値。変更する場合は `CUSTOMER` 自体を変える。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepositoryPolicy {
    pub visibility: Visibility,
    pub default_branch: &'static str,
    pub pipelines_enabled: bool,
    pub issues_enabled: bool,
    pub wiki_enabled: bool,
    pub snippets_enabled: bool,
    pub container_registry_enabled: bool,
    pub merge_requests_enabled: bool,
    pub merge_method: MergeMethod,
    pub only_allow_merge_if_pipeline_succeeds: bool,
    pub shared_runners_enabled: bool,
}

impl RepositoryPolicy {
    pub const CUSTOMER: RepositoryPolicy = RepositoryPolicy {
        visibility: Visibility::Private,
        default_branch: "master",
        pipelines_enabled: true,
        issues_enabled: false,
        wiki_enabled: false,
        snippets_enabled: false,
        container_registry_enabled: false,
        merge_requests_enabled: false,
        merge_method: MergeMethod::FastForward,
        only_allow_merge_if_pipeline_succeeds: true,
        shared_runners_enabled: true,
    };
}

/// 顧客ごとのGitLabプロジェクト
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryProject {
    /// プロジェクト名（slug）
    pub name: String,

    /// 説明（"{表示名} code"）
    pub description: String,

    /// 作成先ネームスペース
    pub namespace_id: Option<i64>,

    pub policy: RepositoryPolicy,
}

impl RepositoryProject {
    pub fn for_customer(ids: &Identifiers, spec: &CustomerSpec) -> Self {
        Self {
            name: ids.slug.clone(),
            description: format!("{} code", spec.display_name),
            namespace_id: spec.namespace,
            policy: RepositoryPolicy::CUSTOMER,
        }
    }
}
