use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::{DeploymentError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.atlassian.com";
pub const DEFAULT_USER_AGENT: &str = "jira-deployments";
pub const TENANT_ID_VAR: &str = "JIRA_CLOUD_ID";
pub const CLIENT_ID_VAR: &str = "JIRA_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "JIRA_CLIENT_SECRET";

/// Immutable client settings: OAuth credentials, the cloud tenant every deployment path is
/// scoped to, and transport knobs. Timeouts are unset by default so reqwest's own behavior applies.
#[derive(Clone)]
pub struct ClientConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub audience: Option<String>,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            audience: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            connect_timeout: None,
        }
    }

    /// Reads `JIRA_CLOUD_ID`, `JIRA_CLIENT_ID` and `JIRA_CLIENT_SECRET` from the process environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(
            required_var(TENANT_ID_VAR)?,
            required_var(CLIENT_ID_VAR)?,
            required_var(CLIENT_SECRET_VAR)?,
        ))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// OAuth audience sent with the token request. Defaults to the host of `base_url`.
    pub fn audience(&self) -> String {
        if let Some(audience) = &self.audience {
            return audience.clone();
        }
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| {
                let without_scheme = self
                    .base_url
                    .split_once("//")
                    .map(|(_, rest)| rest)
                    .unwrap_or(self.base_url.as_str());
                without_scheme.trim_end_matches('/').to_string()
            })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn deployments_root(&self) -> String {
        format!("/jira/deployments/0.1/cloud/{}", self.tenant_id)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("audience", &self.audience)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|err| DeploymentError::Config(format!("{name}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{
        ClientConfig, CLIENT_ID_VAR, CLIENT_SECRET_VAR, DEFAULT_API_BASE, TENANT_ID_VAR,
    };
    use crate::error::DeploymentError;
    use std::env;

    #[test]
    fn new_config_uses_atlassian_defaults() {
        let config = ClientConfig::new("cloud-1", "id", "secret");
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.audience(), "api.atlassian.com");
        assert!(config.timeout.is_none());
        assert!(config.connect_timeout.is_none());
    }

    #[test]
    fn audience_follows_base_url_host() {
        let config = ClientConfig::new("cloud-1", "id", "secret")
            .with_base_url("http://127.0.0.1:4010/");
        assert_eq!(config.audience(), "127.0.0.1");

        let overridden = config.with_audience("api.example.net");
        assert_eq!(overridden.audience(), "api.example.net");
    }

    #[test]
    fn url_for_joins_without_duplicate_slashes() {
        let config = ClientConfig::new("cloud-1", "id", "secret")
            .with_base_url("https://api.atlassian.com/");
        assert_eq!(
            config.url_for("/oauth/token"),
            "https://api.atlassian.com/oauth/token"
        );
    }

    #[test]
    fn deployments_root_is_scoped_to_tenant() {
        let config = ClientConfig::new("abc-123", "id", "secret");
        assert_eq!(
            config.deployments_root(),
            "/jira/deployments/0.1/cloud/abc-123"
        );
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = ClientConfig::new("cloud-1", "id", "super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn from_env_requires_every_credential() {
        env::set_var(TENANT_ID_VAR, "cloud-env");
        env::set_var(CLIENT_ID_VAR, "id-env");
        env::remove_var(CLIENT_SECRET_VAR);

        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            DeploymentError::Config(ref message) if message.contains(CLIENT_SECRET_VAR)
        ));

        env::set_var(CLIENT_SECRET_VAR, "secret-env");
        let config = ClientConfig::from_env().expect("config from env");
        assert_eq!(config.tenant_id, "cloud-env");
        assert_eq!(config.client_id, "id-env");
        assert_eq!(config.client_secret, "secret-env");

        env::remove_var(TENANT_ID_VAR);
        env::remove_var(CLIENT_ID_VAR);
        env::remove_var(CLIENT_SECRET_VAR);
    }
}
