//! Shared fixtures for command tests: an in-memory keychain and a mock
//! provider.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use inkstat_app::AppContext;
use inkstat_core::CredentialPersistence;
use inkstat_domain::{Config, Result, StoredCredential};
use parking_lot::Mutex;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SESSION_PATH: &str = "/connect/1.0.0/api/session_token";
pub const LOGIN_PATH: &str = "/v3/Account/Login";
pub const WEB_SERVICE_PATH: &str = "/v2/Game/GetWebServiceToken";

#[derive(Default)]
pub struct MemoryPersistence {
    record: Mutex<Option<StoredCredential>>,
}

impl MemoryPersistence {
    pub fn seeded(record: StoredCredential) -> Self {
        Self { record: Mutex::new(Some(record)) }
    }

    pub fn stored(&self) -> Option<StoredCredential> {
        self.record.lock().clone()
    }
}

#[async_trait]
impl CredentialPersistence for MemoryPersistence {
    async fn load(&self) -> Result<Option<StoredCredential>> {
        Ok(self.stored())
    }

    async fn save(&self, credential: &StoredCredential) -> Result<()> {
        *self.record.lock() = Some(credential.clone());
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        *self.record.lock() = None;
        Ok(())
    }
}

pub struct TestProvider {
    pub server: MockServer,
}

impl TestProvider {
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        let uri = self.server.uri();
        config.provider.session_token_url = format!("{uri}{SESSION_PATH}");
        config.provider.access_token_url = format!("{uri}{LOGIN_PATH}");
        config.provider.web_service_token_url = format!("{uri}{WEB_SERVICE_PATH}");
        config.provider.cookie_domain =
            Url::parse(&uri).ok().and_then(|u| u.host_str().map(str::to_string)).unwrap_or_default();
        config.http.timeout_secs = 5;
        config
    }

    pub fn redirect(&self, config: &Config) -> String {
        format!(
            "{}://auth#session_state=abc&session_token_code=code-from-browser&state=xyz",
            config.provider.redirect_scheme
        )
    }

    pub async fn mount_session_token(&self) {
        Mock::given(method("POST"))
            .and(path(SESSION_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "session_token": "st-app", "code": "code-from-browser" })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_login_ok(&self, delay: Option<Duration>) {
        let mut response = ResponseTemplate::new(200).set_body_json(json!({
            "status": 0,
            "result": { "access_token": "at-app", "account": { "id": "acct-app", "nickname": "Agent 3" } }
        }));
        if let Some(delay) = delay {
            response = response.set_delay(delay);
        }
        Mock::given(method("POST")).and(path(LOGIN_PATH)).respond_with(response).mount(&self.server).await;
    }

    pub async fn mount_login_status(&self, status: i64) {
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": status, "errorMessage": "rejected" })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_web_service_token(&self) {
        Mock::given(method("POST"))
            .and(path(WEB_SERVICE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "iksm_session=app-cookie; Path=/")
                    .set_body_json(json!({
                        "status": 0,
                        "result": { "accessToken": "ws-app", "expiresIn": 7200 }
                    })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_happy_path(&self) {
        self.mount_session_token().await;
        self.mount_login_ok(None).await;
        self.mount_web_service_token().await;
    }

    pub async fn count(&self, route: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == route)
            .count()
    }
}

pub async fn context(
    provider: &TestProvider,
    persistence: Arc<MemoryPersistence>,
) -> (Arc<AppContext>, Config) {
    let config = provider.config();
    let ctx = AppContext::new_with_persistence(config.clone(), persistence).await.unwrap();
    (Arc::new(ctx), config)
}
