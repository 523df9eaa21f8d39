use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::DeploymentClient;
use crate::error::Result;

pub const TOKEN_PATH: &str = "/oauth/token";
const GRANT_TYPE: &str = "client_credentials";

/// Bearer token returned by the OAuth endpoint. Absent when the response carried no
/// `access_token`; callers still proceed and let the remote service reject the request.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Option<String>);

impl AccessToken {
    pub fn new(value: Option<String>) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(_) => f.write_str("AccessToken(<redacted>)"),
            None => f.write_str("AccessToken(None)"),
        }
    }
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    audience: String,
}

impl DeploymentClient {
    /// Exchanges the configured client credentials for a bearer token. Every call performs a
    /// fresh round-trip; nothing is cached.
    pub async fn acquire_token(&self) -> Result<AccessToken> {
        let config = self.config();
        let payload = TokenRequest {
            client_id: &config.client_id,
            client_secret: &config.client_secret,
            grant_type: GRANT_TYPE,
            audience: config.audience(),
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!(audience = %payload.audience, "requesting client credentials token");
        let body = self
            .send_request(Method::POST, TOKEN_PATH, headers, Some(&payload))
            .await?;

        let token = body
            .as_json()
            .and_then(|value| value.get("access_token"))
            .and_then(|value| value.as_str())
            .map(str::to_string);
        if token.is_none() {
            warn!("token response did not contain an access_token");
        }
        Ok(AccessToken::new(token))
    }
}
