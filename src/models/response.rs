use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Result of a bulk submission. Jira answers 202 even when individual deployments are rejected.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeploymentResponse {
    #[serde(default)]
    pub accepted_deployments: Vec<DeploymentKey>,
    #[serde(default)]
    pub rejected_deployments: Vec<RejectedDeployment>,
    #[serde(default)]
    pub unknown_issue_keys: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentKey {
    pub pipeline_id: String,
    pub environment_id: String,
    pub deployment_sequence_number: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RejectedDeployment {
    pub key: DeploymentKey,
    #[serde(default)]
    pub errors: Vec<ApiErrorMessage>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorMessage {
    pub message: String,
    #[serde(default)]
    pub error_trace_id: Option<String>,
}

/// A stored deployment as returned by the single-deployment lookup.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub deployment_sequence_number: i64,
    pub update_sequence_number: Option<i64>,
    #[serde(default)]
    pub issue_keys: Vec<String>,
    pub display_name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub last_updated: Option<String>,
    pub label: Option<String>,
    pub state: Option<String>,
    pub pipeline: Option<PipelineRecord>,
    pub environment: Option<EnvironmentRecord>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRecord {
    pub id: Value,
    pub display_name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRecord {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub environment_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{BulkDeploymentResponse, DeploymentRecord};
    use serde_json::json;

    #[test]
    fn deployment_record_keeps_unknown_fields_in_extra() {
        let record: DeploymentRecord = serde_json::from_value(json!({
            "deploymentSequenceNumber": 42,
            "updateSequenceNumber": 42,
            "issueKeys": ["WEB-1"],
            "displayName": "Web #42",
            "url": "https://ci.example.com/builds/42",
            "description": "Deployment of build #42",
            "lastUpdated": "2024-03-05T12:30:00.000Z",
            "label": "deploy-web",
            "state": "successful",
            "pipeline": { "id": 42, "displayName": "deploy-web", "url": "https://ci.example.com" },
            "environment": { "id": "prod", "displayName": "prod", "type": "production" },
            "schemaVersion": "1.0"
        }))
        .unwrap();

        assert_eq!(record.deployment_sequence_number, 42);
        assert_eq!(record.issue_keys, vec!["WEB-1"]);
        assert_eq!(record.pipeline.unwrap().id, json!(42));
        let environment = record.environment.unwrap();
        assert_eq!(environment.id, "prod");
        assert_eq!(environment.environment_type.as_deref(), Some("production"));
        assert_eq!(record.extra.get("schemaVersion"), Some(&json!("1.0")));
        assert!(!record.extra.contains_key("label"));
    }

    #[test]
    fn rejected_deployments_carry_error_messages() {
        let response: BulkDeploymentResponse = serde_json::from_value(json!({
            "acceptedDeployments": [],
            "rejectedDeployments": [{
                "key": {
                    "pipelineId": "42",
                    "environmentId": "prod",
                    "deploymentSequenceNumber": 42
                },
                "errors": [
                    { "message": "lastUpdated is in the future", "errorTraceId": "trace-1" },
                    { "message": "state is invalid" }
                ]
            }]
        }))
        .unwrap();

        assert!(response.accepted_deployments.is_empty());
        assert!(response.unknown_issue_keys.is_empty());
        let rejected = &response.rejected_deployments[0];
        assert_eq!(rejected.key.environment_id, "prod");
        assert_eq!(rejected.errors.len(), 2);
        assert_eq!(rejected.errors[0].error_trace_id.as_deref(), Some("trace-1"));
        assert!(rejected.errors[1].error_trace_id.is_none());
    }
}
