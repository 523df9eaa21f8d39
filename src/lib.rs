//! Client for recording deployments in Jira Software Cloud using OAuth client credentials.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod issue_keys;
pub mod models;

pub use auth::AccessToken;
pub use client::{DeploymentClient, ResponseBody};
pub use config::ClientConfig;
pub use error::{DeploymentError, Result};
pub use issue_keys::{extract_issue_keys, CommitLog, GitCommitLog};
pub use models::{
    BulkDeploymentResponse, DeploymentPayload, DeploymentRecord, DeploymentRequest,
    DeploymentState, EnvironmentType,
};
