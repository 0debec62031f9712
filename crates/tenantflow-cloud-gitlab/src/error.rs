//! GitLab provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitLabError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("GitLab rejected the token: {0}")]
    Unauthorized(String),

    #[error("GitLab API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GitLabError>;
