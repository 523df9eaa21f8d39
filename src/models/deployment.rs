//! Deployment request input and the bulk-create wire payload.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Pending,
    InProgress,
    Successful,
    Cancelled,
    Failed,
    RolledBack,
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentType {
    Production,
    Staging,
    Testing,
}

/// One deployment event as described by the caller. Optional fields are filled in when the
/// payload is built.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub build_number: i64,
    pub pipeline_name: String,
    pub pipeline_url: String,
    pub display_name: String,
    pub state: DeploymentState,
    pub environment_name: String,
    pub environment_type: EnvironmentType,
    pub issue_keys: Option<Vec<String>>,
    pub description: Option<String>,
    pub label: Option<String>,
    pub last_updated: Option<String>,
}

impl DeploymentRequest {
    pub fn new(
        build_number: i64,
        pipeline_name: impl Into<String>,
        pipeline_url: impl Into<String>,
        display_name: impl Into<String>,
        state: DeploymentState,
        environment_name: impl Into<String>,
        environment_type: EnvironmentType,
    ) -> Self {
        Self {
            build_number,
            pipeline_name: pipeline_name.into(),
            pipeline_url: pipeline_url.into(),
            display_name: display_name.into(),
            state,
            environment_name: environment_name.into(),
            environment_type,
            issue_keys: None,
            description: None,
            label: None,
            last_updated: None,
        }
    }

    pub fn with_issue_keys(mut self, keys: Vec<String>) -> Self {
        self.issue_keys = Some(keys);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_last_updated(mut self, timestamp: impl Into<String>) -> Self {
        self.last_updated = Some(timestamp.into());
        self
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPayload {
    pub schema_version: String,
    pub deployment_sequence_number: i64,
    pub update_sequence_number: i64,
    pub issue_keys: Vec<String>,
    pub display_name: String,
    pub url: String,
    pub description: String,
    pub last_updated: String,
    pub label: String,
    pub state: DeploymentState,
    pub pipeline: PipelinePayload,
    pub environment: EnvironmentPayload,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePayload {
    pub id: i64,
    pub display_name: String,
    pub url: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentPayload {
    pub id: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub environment_type: EnvironmentType,
}

impl DeploymentPayload {
    /// Applies defaults to every optional request field. `fallback_issue_keys` is used only when
    /// the request carries no keys of its own.
    pub fn from_request(
        request: DeploymentRequest,
        fallback_issue_keys: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let build_number = request.build_number;
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            deployment_sequence_number: build_number,
            update_sequence_number: build_number,
            issue_keys: request.issue_keys.unwrap_or(fallback_issue_keys),
            display_name: request.display_name,
            url: request.pipeline_url.clone(),
            description: request
                .description
                .unwrap_or_else(|| default_description(build_number)),
            last_updated: request
                .last_updated
                .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            label: request
                .label
                .unwrap_or_else(|| request.pipeline_name.clone()),
            state: request.state,
            pipeline: PipelinePayload {
                id: build_number,
                display_name: request.pipeline_name,
                url: request.pipeline_url,
            },
            environment: EnvironmentPayload {
                id: request.environment_name.clone(),
                display_name: request.environment_name,
                environment_type: request.environment_type,
            },
        }
    }
}

fn default_description(build_number: i64) -> String {
    format!("Deployment of build #{build_number}")
}

/// Body of the bulk-create endpoint.
#[derive(Debug, Serialize, Clone)]
pub struct BulkDeploymentRequest {
    pub deployments: Vec<DeploymentPayload>,
}
