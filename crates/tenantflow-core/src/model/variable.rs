//! GitLab CI/CD変数の宣言

use serde::{Deserialize, Serialize};

/// サービスアカウント鍵を受け取る変数名
pub const GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// すべての環境に適用するスコープ
pub const ALL_ENVIRONMENTS: &str = "*";

/// 変数の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    EnvVar,
    File,
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::EnvVar => write!(f, "env_var"),
            VariableType::File => write!(f, "file"),
        }
    }
}

/// 保護されたCI/CD変数
#[derive(Clone, PartialEq, Eq)]
pub struct ProtectedVariable {
    pub key: String,

    /// 平文の値（認証情報ファイルの中身）
    pub value: String,

    pub protected: bool,
    pub environment_scope: String,
    pub variable_type: VariableType,
}

impl ProtectedVariable {
    /// `GOOGLE_APPLICATION_CREDENTIALS` をファイル変数として作る
    pub fn credentials_file(value: impl Into<String>) -> Self {
        Self {
            key: GOOGLE_APPLICATION_CREDENTIALS.to_string(),
            value: value.into(),
            protected: true,
            environment_scope: ALL_ENVIRONMENTS.to_string(),
            variable_type: VariableType::File,
        }
    }
}

impl std::fmt::Debug for ProtectedVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectedVariable")
            .field("key", &self.key)
            .field("value", &"<redacted>")
            .field("protected", &self.protected)
            .field("environment_scope", &self.environment_scope)
            .field("variable_type", &self.variable_type)
            .finish()
    }
}
