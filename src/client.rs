use std::sync::Arc;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::task;
use tracing::{debug, warn};

use crate::auth::AccessToken;
use crate::config::ClientConfig;
use crate::error::{DeploymentError, Result};
use crate::issue_keys::{extract_issue_keys, CommitLog, GitCommitLog};
use crate::models::{BulkDeploymentRequest, DeploymentPayload, DeploymentRequest};

/// Response body of any call, discriminated by whether it parsed as JSON. Status codes are not
/// inspected, so error documents from the API arrive here too.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Structured(Value),
    Raw(String),
}

impl ResponseBody {
    fn from_text(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => ResponseBody::Structured(value),
            Err(err) => {
                if !text.is_empty() {
                    debug!(error = %err, "response body is not JSON, keeping raw text");
                }
                ResponseBody::Raw(text)
            }
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ResponseBody::Structured(_))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Structured(value) => Some(value),
            ResponseBody::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            ResponseBody::Structured(_) => None,
            ResponseBody::Raw(text) => Some(text),
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            ResponseBody::Structured(value) => Some(value),
            ResponseBody::Raw(_) => None,
        }
    }

    /// Decodes a structured body into a typed model. Returns `None` for raw bodies.
    pub fn deserialize<T>(&self) -> Option<Result<T>>
    where
        T: DeserializeOwned,
    {
        self.as_json()
            .map(|value| serde_json::from_value(value.clone()).map_err(DeploymentError::from))
    }
}

#[derive(Clone)]
pub struct DeploymentClient {
    http: HttpClient,
    config: ClientConfig,
    commit_log: Arc<dyn CommitLog>,
}

impl DeploymentClient {
    /// Builds a client that derives issue keys from the git checkout in the current directory.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_commit_log(config, GitCommitLog::new())
    }

    pub fn with_commit_log(
        config: ClientConfig,
        commit_log: impl CommitLog + 'static,
    ) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            commit_log: Arc::new(commit_log),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends one request and reads the whole body before parsing it. Only transport failures
    /// are errors.
    pub async fn send_request<B>(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<&B>,
    ) -> Result<ResponseBody>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.url_for(path);
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method, url).headers(headers);
        if let Some(payload) = body {
            request = request.json(payload);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%status, bytes = text.len(), "response received");

        Ok(ResponseBody::from_text(text))
    }

    /// Issue keys referenced by the commit history, read fresh on every call. The collaborator
    /// runs on the blocking pool since it walks the whole history.
    pub async fn issue_keys(&self) -> Result<Vec<String>> {
        let commit_log = Arc::clone(&self.commit_log);
        let log = task::spawn_blocking(move || commit_log.summaries())
            .await
            .map_err(|err| DeploymentError::CommitLog(format!("commit log task failed: {err}")))??;
        Ok(extract_issue_keys(&log))
    }

    /// Submits one deployment through the bulk endpoint. Git history is consulted only when the
    /// request carries no issue keys.
    pub async fn save_deployment(&self, request: DeploymentRequest) -> Result<ResponseBody> {
        let token = self.acquire_token().await?;

        // Commit log failures surface after the token round-trip.
        let fallback_keys = match request.issue_keys {
            Some(_) => Vec::new(),
            None => self.issue_keys().await?,
        };
        let payload = DeploymentPayload::from_request(request, fallback_keys, Utc::now());
        let body = BulkDeploymentRequest {
            deployments: vec![payload],
        };

        let mut headers = bearer_headers(&token)?;
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let path = format!("{}/bulk", self.config.deployments_root());
        self.send_request(Method::POST, &path, headers, Some(&body))
            .await
    }

    /// Looks up one deployment. Identifiers are spliced into the path unvalidated; only a URL
    /// reqwest refuses to build fails locally, as `DeploymentError::Request`.
    pub async fn get_deployment(
        &self,
        pipeline_id: &str,
        environment_id: &str,
        sequence_number: i64,
    ) -> Result<ResponseBody> {
        self.single_deployment(Method::GET, pipeline_id, environment_id, sequence_number)
            .await
    }

    /// Removes one deployment. Same path handling as [`DeploymentClient::get_deployment`].
    pub async fn delete_deployment(
        &self,
        pipeline_id: &str,
        environment_id: &str,
        sequence_number: i64,
    ) -> Result<ResponseBody> {
        self.single_deployment(Method::DELETE, pipeline_id, environment_id, sequence_number)
            .await
    }

    async fn single_deployment(
        &self,
        method: Method,
        pipeline_id: &str,
        environment_id: &str,
        sequence_number: i64,
    ) -> Result<ResponseBody> {
        let token = self.acquire_token().await?;
        let headers = bearer_headers(&token)?;
        let path = deployment_path(
            &self.config.deployments_root(),
            pipeline_id,
            environment_id,
            sequence_number,
        );
        self.send_request(method, &path, headers, Option::<&Value>::None)
            .await
    }
}

fn deployment_path(
    root: &str,
    pipeline_id: &str,
    environment_id: &str,
    sequence_number: i64,
) -> String {
    format!(
        "{}/pipelines/{}/environments/{}/deployments/{}",
        root, pipeline_id, environment_id, sequence_number
    )
}

fn bearer_headers(token: &AccessToken) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    match token.as_str() {
        Some(value) => {
            let auth = HeaderValue::from_str(&format!("Bearer {value}"))
                .map_err(|err| DeploymentError::Config(format!("invalid bearer token: {err}")))?;
            headers.insert(AUTHORIZATION, auth);
        }
        None => warn!("sending request without a bearer token"),
    }
    Ok(headers)
}

fn build_http_client(config: &ClientConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    let user_agent = HeaderValue::from_str(&config.user_agent)
        .map_err(|err| DeploymentError::Config(format!("invalid user agent: {err}")))?;
    headers.insert(USER_AGENT, user_agent);

    let mut builder = HttpClient::builder().default_headers(headers);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    builder
        .build()
        .map_err(|err| DeploymentError::Config(err.to_string()))
}
