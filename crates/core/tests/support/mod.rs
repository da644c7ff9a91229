//! Shared test helpers for `inkstat-core` integration tests.
//!
//! In-memory fakes for the login ports so tests can script provider
//! responses and inspect what was persisted.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use inkstat_common::lifecycle::EventBus;
use inkstat_core::auth::ports::{CookiePurger, CredentialPersistence, TokenExchangeApi};
use inkstat_core::{CredentialStore, LoginDependencies};
use inkstat_domain::{
    AccessGrant, AccessToken, ApiError, AuthorizationCode, CodeVerifier, CredentialEvent,
    Identity, InkstatError, LoginEvent, Result as DomainResult, SessionToken, StoredCredential,
    WebServiceToken,
};
use parking_lot::Mutex;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A provider call recorded by [`ScriptedExchangeApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SessionToken { code: String, verifier: String },
    AccessToken { session_token: String },
    WebServiceToken { access_token: String },
}

pub fn identity() -> Identity {
    Identity {
        account_id: "acct-1".to_string(),
        nickname: Some("Inkling".to_string()),
        linked_game: true,
    }
}

/// Scripted provider: each stage returns a fixed result.
pub struct ScriptedExchangeApi {
    session: ApiResult<SessionToken>,
    access: ApiResult<AccessGrant>,
    web_service: ApiResult<WebServiceToken>,
    block_access: AtomicBool,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedExchangeApi {
    /// Every stage succeeds.
    pub fn succeeding() -> Self {
        Self {
            session: Ok(SessionToken::new("session-1")),
            access: Ok(AccessGrant { access_token: AccessToken::new("access-1"), identity: identity() }),
            web_service: Ok(WebServiceToken::new("ws-1", 7200)),
            block_access: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_session(mut self, result: ApiResult<SessionToken>) -> Self {
        self.session = result;
        self
    }

    pub fn with_access(mut self, result: ApiResult<AccessGrant>) -> Self {
        self.access = result;
        self
    }

    pub fn with_web_service(mut self, result: ApiResult<WebServiceToken>) -> Self {
        self.web_service = result;
        self
    }

    /// Stage 2 never completes.
    pub fn blocking_access(self) -> Self {
        self.block_access.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TokenExchangeApi for ScriptedExchangeApi {
    async fn exchange_session_token(
        &self,
        code: &AuthorizationCode,
        verifier: &CodeVerifier,
    ) -> ApiResult<SessionToken> {
        self.calls.lock().push(Call::SessionToken {
            code: code.as_str().to_string(),
            verifier: verifier.as_str().to_string(),
        });
        self.session.clone()
    }

    async fn exchange_access_token(&self, session_token: &SessionToken) -> ApiResult<AccessGrant> {
        self.calls
            .lock()
            .push(Call::AccessToken { session_token: session_token.as_str().to_string() });
        if self.block_access.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.access.clone()
    }

    async fn exchange_web_service_token(
        &self,
        access_token: &AccessToken,
    ) -> ApiResult<WebServiceToken> {
        self.calls
            .lock()
            .push(Call::WebServiceToken { access_token: access_token.as_str().to_string() });
        self.web_service.clone()
    }
}

/// Persistence backed by a single in-memory slot.
#[derive(Default)]
pub struct MemoryPersistence {
    slot: Mutex<Option<StoredCredential>>,
    pub saves: AtomicUsize,
    pub deletes: AtomicUsize,
    pub fail_delete: AtomicBool,
    /// Held by a test to stall every `save` until released.
    pub save_gate: tokio::sync::Mutex<()>,
}

impl MemoryPersistence {
    pub fn seeded(credential: StoredCredential) -> Self {
        let persistence = Self::default();
        *persistence.slot.lock() = Some(credential);
        persistence
    }

    pub fn stored(&self) -> Option<StoredCredential> {
        self.slot.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialPersistence for MemoryPersistence {
    async fn load(&self) -> DomainResult<Option<StoredCredential>> {
        Ok(self.slot.lock().clone())
    }

    async fn save(&self, credential: &StoredCredential) -> DomainResult<()> {
        let _gate = self.save_gate.lock().await;
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock() = Some(credential.clone());
        Ok(())
    }

    async fn delete(&self) -> DomainResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(InkstatError::Storage("keychain locked".into()));
        }
        *self.slot.lock() = None;
        Ok(())
    }
}

/// Cookie purger that records which domains were purged.
#[derive(Default)]
pub struct RecordingCookies {
    purged: Mutex<Vec<String>>,
}

impl RecordingCookies {
    pub fn purged(&self) -> Vec<String> {
        self.purged.lock().clone()
    }
}

impl CookiePurger for RecordingCookies {
    fn purge_domain(&self, domain: &str) -> usize {
        self.purged.lock().push(domain.to_string());
        1
    }
}

pub const COOKIE_DOMAIN: &str = "nintendo.net";

/// Wired fakes for one test.
pub struct Harness {
    pub api: Arc<ScriptedExchangeApi>,
    pub persistence: Arc<MemoryPersistence>,
    pub cookies: Arc<RecordingCookies>,
    pub store: Arc<CredentialStore>,
    pub credential_events: EventBus<CredentialEvent>,
    pub login_events: EventBus<LoginEvent>,
}

impl Harness {
    pub fn new(api: ScriptedExchangeApi) -> Self {
        Self::with_persistence(api, MemoryPersistence::default())
    }

    pub fn with_persistence(api: ScriptedExchangeApi, persistence: MemoryPersistence) -> Self {
        let api = Arc::new(api);
        let persistence = Arc::new(persistence);
        let cookies = Arc::new(RecordingCookies::default());
        let credential_events = EventBus::new(8);
        let store = Arc::new(CredentialStore::new(
            persistence.clone(),
            cookies.clone(),
            COOKIE_DOMAIN,
            credential_events.clone(),
        ));
        Self { api, persistence, cookies, store, credential_events, login_events: EventBus::new(8) }
    }

    pub fn deps(&self) -> LoginDependencies {
        LoginDependencies {
            api: self.api.clone(),
            store: self.store.clone(),
            login_events: self.login_events.clone(),
        }
    }
}
