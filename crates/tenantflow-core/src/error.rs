use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("設定ファイルエラー: {0}")]
    Config(#[from] tenantflow_config::ConfigError),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("顧客 '{0}' が重複して定義されています")]
    DuplicateCustomer(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
