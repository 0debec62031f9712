use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "マニフェストが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: tenantflow.local.kdl, tenantflow.kdl\n\
        - ./.tenantflow/ ディレクトリ\n\
        - ~/.config/tenantflow/tenantflow.kdl\n\
        または TENANTFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ManifestNotFound,

    #[error("環境変数 {name} の値が不正です: {value}")]
    InvalidEnvVar { name: String, value: String },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
