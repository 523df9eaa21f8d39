//! Error model used by deployment client operations.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeploymentError>;

/// Failures that abort an operation locally. Non-2xx statuses, unparseable bodies and missing
/// tokens are not errors; they surface through the returned `ResponseBody` instead.
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("commit log error: {0}")]
    CommitLog(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for DeploymentError {
    /// Converts reqwest transport errors into semantic variants.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DeploymentError::Timeout(err.to_string())
        } else if err.is_connect() {
            DeploymentError::Network(err.to_string())
        } else {
            DeploymentError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DeploymentError {
    fn from(err: serde_json::Error) -> Self {
        DeploymentError::Serialization(err.to_string())
    }
}
