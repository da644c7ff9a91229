//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use inkstat_common::lifecycle::EventBus;
use inkstat_core::{
    CredentialPersistence, CredentialStore, LoginDependencies, LoginSession, TokenExchangeApi,
};
use inkstat_domain::constants::EVENT_CHANNEL_CAPACITY;
use inkstat_domain::{Config, CredentialEvent, LoginEvent, Result};
use inkstat_infra::{
    config, HttpClient, KeychainCredentialStore, ProviderExchangeClient, SessionCookieJar,
};
use parking_lot::Mutex;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub credentials: Arc<CredentialStore>,
    pub cookies: Arc<SessionCookieJar>,
    pub login_events: EventBus<LoginEvent>,
    pub credential_events: EventBus<CredentialEvent>,

    /// Provider client sharing the app cookie jar; used after login.
    api: Arc<dyn TokenExchangeApi>,
    active_login: Mutex<Option<Arc<LoginSession>>>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("credentials", &self.credentials)
            .field("login_active", &self.active_login.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Create a context from the layered configuration (file + environment).
    ///
    /// # Errors
    /// Returns an error if configuration, keychain access or HTTP client
    /// setup fails.
    pub async fn new() -> Result<Self> {
        Self::new_with_config(config::load()?).await
    }

    /// Create a context backed by the platform keychain.
    ///
    /// # Errors
    /// See [`AppContext::new`].
    pub async fn new_with_config(config: Config) -> Result<Self> {
        let keychain = Arc::new(KeychainCredentialStore::from_config(&config.storage)?);
        Self::new_with_persistence(config, keychain).await
    }

    /// Create a context with a custom persistence backend.
    ///
    /// The stored credential is loaded before this returns, so the
    /// credential store reflects the previous session immediately.
    ///
    /// # Errors
    /// Returns an error if loading the stored credential or building the
    /// HTTP client fails.
    pub async fn new_with_persistence(
        config: Config,
        persistence: Arc<dyn CredentialPersistence>,
    ) -> Result<Self> {
        let cookies = Arc::new(SessionCookieJar::new());
        let credential_events = EventBus::new(EVENT_CHANNEL_CAPACITY);
        let login_events = EventBus::new(EVENT_CHANNEL_CAPACITY);

        let credentials = Arc::new(CredentialStore::new(
            persistence,
            cookies.clone(),
            config.provider.cookie_domain.clone(),
            credential_events.clone(),
        ));

        let snapshot = credentials.init().await.map_err(|err| {
            tracing::error!(error = %err, "failed to load stored credential");
            err
        })?;
        tracing::info!(signed_in = snapshot.is_signed_in(), "credential store initialized");

        let http = Self::http_builder(&config).cookie_store(cookies.clone()).build()?;
        let api: Arc<dyn TokenExchangeApi> =
            Arc::new(ProviderExchangeClient::new(http, &config.provider)?);

        Ok(Self {
            config,
            credentials,
            cookies,
            login_events,
            credential_events,
            api,
            active_login: Mutex::new(None),
        })
    }

    fn http_builder(config: &Config) -> inkstat_infra::HttpClientBuilder {
        HttpClient::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .user_agent(config.http.user_agent.clone())
            .max_attempts(config.http.max_attempts as usize)
    }

    /// Dependencies for a new login attempt.
    ///
    /// Every attempt gets its own HTTP client with no cookie store, so
    /// nothing from a previous or abandoned attempt leaks into it.
    ///
    /// # Errors
    /// Returns a configuration error if the client cannot be built.
    pub fn login_dependencies(&self) -> Result<LoginDependencies> {
        let http = Self::http_builder(&self.config).build()?;
        let api = Arc::new(ProviderExchangeClient::new(http, &self.config.provider)?);
        Ok(LoginDependencies {
            api,
            store: Arc::clone(&self.credentials),
            login_events: self.login_events.clone(),
        })
    }

    /// Provider client used once signed in.
    pub fn api(&self) -> Arc<dyn TokenExchangeApi> {
        Arc::clone(&self.api)
    }

    /// Replace the active login attempt, returning the previous one.
    pub fn replace_login(&self, session: Option<Arc<LoginSession>>) -> Option<Arc<LoginSession>> {
        std::mem::replace(&mut *self.active_login.lock(), session)
    }

    pub fn active_login(&self) -> Option<Arc<LoginSession>> {
        self.active_login.lock().clone()
    }
}
