//! Session configuration: where the API lives and who is calling it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ApiError;

/// Path prefix of the REST API below the account URL.
pub const API_PREFIX: &str = "/api/v2";

/// Connection settings shared by every request of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Account URL, e.g. `https://acme.zendesk.com`, without trailing slash.
    pub url: String,
    pub username: String,
    /// API token; takes precedence over `password` for Basic auth.
    pub token: Option<String>,
    pub password: Option<String>,
    /// Shared secret used to sign JWT single sign-on tokens.
    pub jwt_token: Option<String>,
    /// Serve every request from the in-memory mock store.
    pub mock: bool,
}

impl Config {
    pub fn new(url: &str, username: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            token: None,
            password: None,
            jwt_token: None,
            mock: false,
        }
    }

    pub fn for_subdomain(subdomain: &str, username: &str) -> Self {
        Self::new(&format!("https://{subdomain}.zendesk.com"), username)
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn with_jwt_token(mut self, jwt_token: &str) -> Self {
        self.jwt_token = Some(jwt_token.to_string());
        self
    }

    pub fn mocked(mut self) -> Self {
        self.mock = true;
        self
    }

    /// Read the configuration from `ZENDESK_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// `ZENDESK_URL` wins over `ZENDESK_SUBDOMAIN`; one of them and
    /// `ZENDESK_USERNAME` must be set. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let username = get("ZENDESK_USERNAME").ok_or(ApiError::MissingCredential("ZENDESK_USERNAME"))?;
        let mut config = match (get("ZENDESK_URL"), get("ZENDESK_SUBDOMAIN")) {
            (Some(url), _) => Self::new(&url, &username),
            (None, Some(subdomain)) => Self::for_subdomain(&subdomain, &username),
            (None, None) => return Err(ApiError::MissingCredential("ZENDESK_URL")),
        };
        config.token = get("ZENDESK_TOKEN");
        config.password = get("ZENDESK_PASSWORD");
        config.jwt_token = get("ZENDESK_JWT_TOKEN");
        config.mock = get("ZENDESK_MOCK")
            .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Ok(config)
    }

    /// Root every API path is appended to.
    pub fn api_root(&self) -> String {
        format!("{}{API_PREFIX}", self.url)
    }

    /// Basic credential for the `authorization` header, if any is configured.
    pub fn authorization(&self) -> Option<String> {
        let credential = match (&self.token, &self.password) {
            (Some(token), _) => format!("{}/token:{token}", self.username),
            (None, Some(password)) => format!("{}:{password}", self.username),
            (None, None) => return None,
        };
        Some(format!("Basic {}", STANDARD.encode(credential)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = Config::new("https://acme.zendesk.com/", "agent@acme.com");
        assert_eq!(config.url, "https://acme.zendesk.com");
        assert_eq!(config.api_root(), "https://acme.zendesk.com/api/v2");
    }

    #[test]
    fn token_authorization_uses_token_suffix() {
        let config = Config::new("https://acme.zendesk.com", "agent@acme.com").with_token("abc");
        // base64("agent@acme.com/token:abc")
        assert_eq!(
            config.authorization().as_deref(),
            Some("Basic YWdlbnRAYWNtZS5jb20vdG9rZW46YWJj")
        );
    }

    #[test]
    fn token_wins_over_password() {
        let config = Config::new("https://acme.zendesk.com", "a")
            .with_password("pw")
            .with_token("t");
        assert_eq!(config.authorization().as_deref(), Some("Basic YS90b2tlbjp0"));
    }

    #[test]
    fn no_credentials_means_no_header() {
        let config = Config::new("https://acme.zendesk.com", "a");
        assert!(config.authorization().is_none());
    }

    #[test]
    fn from_lookup_reads_subdomain_and_mock_flag() {
        let config = Config::from_lookup(lookup(&[
            ("ZENDESK_SUBDOMAIN", "acme"),
            ("ZENDESK_USERNAME", "agent@acme.com"),
            ("ZENDESK_TOKEN", "t"),
            ("ZENDESK_MOCK", "true"),
        ]))
        .unwrap();
        assert_eq!(config.url, "https://acme.zendesk.com");
        assert_eq!(config.token.as_deref(), Some("t"));
        assert!(config.mock);
        assert!(config.jwt_token.is_none());
    }

    #[test]
    fn from_lookup_requires_username() {
        let err = Config::from_lookup(lookup(&[("ZENDESK_URL", "https://x.test")])).unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential("ZENDESK_USERNAME")));
    }

    #[test]
    fn from_lookup_requires_location() {
        let err = Config::from_lookup(lookup(&[("ZENDESK_USERNAME", "a"), ("ZENDESK_URL", " ")])).unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential("ZENDESK_URL")));
    }
}
