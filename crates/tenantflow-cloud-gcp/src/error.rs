//! Google Cloud provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcpError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Google Cloud rejected the access token: {0}")]
    Unauthorized(String),

    #[error("Google Cloud API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Operation {name} failed: {message}")]
    OperationFailed { name: String, message: String },

    #[error("Operation {0} did not complete in time")]
    OperationTimeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GcpError>;
