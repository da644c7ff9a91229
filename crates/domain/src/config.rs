//! Configuration management

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ACCESS_TOKEN_URL, AUTHORIZE_URL, CHALLENGE_METHOD_PARAM, CHALLENGE_PARAM,
    DEFAULT_CLIENT_ID, DEFAULT_COOKIE_DOMAIN, DEFAULT_GAME_ID, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_KEYCHAIN_ACCOUNT, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_REDIRECT_SCHEME, DEFAULT_SCOPE,
    DEFAULT_USER_AGENT, GRANT_TYPE, REDIRECT_HOST, RESPONSE_TYPE, SESSION_TOKEN_URL,
    WEB_SERVICE_TOKEN_URL,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Account provider endpoints and login parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub client_id: String,
    /// Custom URI scheme the provider redirects to after login.
    pub redirect_scheme: String,
    pub authorize_url: String,
    pub session_token_url: String,
    pub access_token_url: String,
    pub web_service_token_url: String,
    pub scope: String,
    pub response_type: String,
    pub challenge_param: String,
    pub challenge_method_param: String,
    pub grant_type: String,
    pub game_id: i64,
    /// Domain whose cookies are purged on logout.
    pub cookie_domain: String,
    /// Additional query parameters appended to the authorize URL.
    pub extra_params: BTreeMap<String, String>,
}

impl ProviderConfig {
    /// Full redirect URI registered with the provider.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}://{}", self.redirect_scheme, REDIRECT_HOST)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let mut extra_params = BTreeMap::new();
        extra_params.insert("theme".to_string(), "login_form".to_string());

        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            redirect_scheme: DEFAULT_REDIRECT_SCHEME.to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
            session_token_url: SESSION_TOKEN_URL.to_string(),
            access_token_url: ACCESS_TOKEN_URL.to_string(),
            web_service_token_url: WEB_SERVICE_TOKEN_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            response_type: RESPONSE_TYPE.to_string(),
            challenge_param: CHALLENGE_PARAM.to_string(),
            challenge_method_param: CHALLENGE_METHOD_PARAM.to_string(),
            grant_type: GRANT_TYPE.to_string(),
            game_id: DEFAULT_GAME_ID,
            cookie_domain: DEFAULT_COOKIE_DOMAIN.to_string(),
            extra_params,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Attempts per idempotent request. Token exchanges are never retried.
    pub max_attempts: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_attempts: 1,
        }
    }
}

/// Credential persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub keychain_service: String,
    pub keychain_account: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            keychain_service: DEFAULT_KEYCHAIN_SERVICE.to_string(),
            keychain_account: DEFAULT_KEYCHAIN_ACCOUNT.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_provider_matches_login_endpoints() {
        let provider = ProviderConfig::default();
        assert_eq!(provider.client_id, "71b963c1b7b6d119");
        assert_eq!(provider.redirect_uri(), "npf71b963c1b7b6d119://auth");
        assert_eq!(provider.response_type, "session_token_code");
        assert_eq!(provider.extra_params.get("theme").map(String::as_str), Some("login_form"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"http": {"timeout_secs": 5}}"#).unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.max_attempts, 1);
        assert_eq!(config.provider, ProviderConfig::default());
        assert_eq!(config.logging.level, "info");
    }
}
