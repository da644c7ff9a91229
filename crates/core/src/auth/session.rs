//! A single login attempt from authorize URL to stored credential

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use inkstat_common::auth::{
    AuthorizationRequest, NavigationDecision, PkceChallenge, RedirectInterceptor,
};
use inkstat_common::lifecycle::EventBus;
use inkstat_domain::{
    ApiError, AuthorizationCode, CodeVerifier, LoginEvent, LoginOutcome, LoginState,
    ProviderConfig, Result,
};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use super::credential_store::CredentialStore;
use super::login_state::LoginStateMachine;
use super::pipeline::TokenExchangePipeline;
use super::ports::TokenExchangeApi;

/// Collaborators shared by every login attempt.
#[derive(Clone)]
pub struct LoginDependencies {
    pub api: Arc<dyn TokenExchangeApi>,
    pub store: Arc<CredentialStore>,
    pub login_events: EventBus<LoginEvent>,
}

/// Result of handing a browser navigation to the session.
#[derive(Debug)]
pub enum NavigationOutcome {
    /// Not the redirect; the browser loads the page.
    Allow,
    /// Redirect without a usable code. Navigation is cancelled, nothing runs.
    CancelledWithoutCode,
    /// Code captured; the pipeline is running on the returned task.
    Started(JoinHandle<std::result::Result<LoginOutcome, ApiError>>),
    /// The code for this attempt was already delivered.
    Duplicate,
}

impl NavigationOutcome {
    /// Whether the browser should cancel the navigation.
    #[must_use]
    pub fn cancels_navigation(&self) -> bool {
        !matches!(self, Self::Allow)
    }
}

/// One login attempt.
///
/// A new attempt is a new session: fresh PKCE values, a fresh state machine
/// and a fresh cancellation token.
pub struct LoginSession {
    verifier: CodeVerifier,
    interceptor: RedirectInterceptor,
    pipeline: TokenExchangePipeline,
    cancel: CancellationToken,
    code_claimed: AtomicBool,
    outcome: Mutex<Option<LoginOutcome>>,
}

impl std::fmt::Debug for LoginSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginSession")
            .field("state", &self.state())
            .field("code_claimed", &self.code_claimed.load(Ordering::Acquire))
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl LoginSession {
    /// Begin an attempt, returning the session and the URL to open in the
    /// embedded browser.
    ///
    /// # Errors
    /// Returns a configuration error if the authorize endpoint is invalid.
    pub fn start(provider: &ProviderConfig, deps: LoginDependencies) -> Result<(Arc<Self>, Url)> {
        let challenge = PkceChallenge::generate();
        let url = AuthorizationRequest::build(provider, &challenge)?;

        let state = Arc::new(LoginStateMachine::new(deps.login_events));
        let pipeline = TokenExchangePipeline::new(deps.api, deps.store, state);

        let session = Arc::new(Self {
            verifier: challenge.code_verifier,
            interceptor: RedirectInterceptor::new(provider.redirect_scheme.clone()),
            pipeline,
            cancel: CancellationToken::new(),
            code_claimed: AtomicBool::new(false),
            outcome: Mutex::new(None),
        });
        debug!(authorize_host = url.host_str().unwrap_or_default(), "login attempt started");
        Ok((session, url))
    }

    /// Inspect a navigation of the embedded browser.
    ///
    /// The first redirect carrying a code starts the pipeline on a tokio task;
    /// later ones are reported as [`NavigationOutcome::Duplicate`].
    pub fn handle_navigation(self: &Arc<Self>, url: &str) -> NavigationOutcome {
        let code = match self.interceptor.intercept(url) {
            NavigationDecision::Allow => return NavigationOutcome::Allow,
            NavigationDecision::Cancel { code: None } => {
                debug!("redirect without session_token_code ignored");
                return NavigationOutcome::CancelledWithoutCode;
            }
            NavigationDecision::Cancel { code: Some(code) } => code,
        };

        if self.code_claimed.swap(true, Ordering::AcqRel) {
            debug!("duplicate redirect callback suppressed");
            return NavigationOutcome::Duplicate;
        }

        let session = Arc::clone(self);
        NavigationOutcome::Started(tokio::spawn(async move { session.exchange(code).await }))
    }

    async fn exchange(
        &self,
        code: AuthorizationCode,
    ) -> std::result::Result<LoginOutcome, ApiError> {
        let result = self
            .pipeline
            .run(code, self.verifier.clone(), self.cancel.child_token())
            .await;
        if let Ok(outcome) = &result {
            *self.outcome.lock() = Some(outcome.clone());
        }
        result
    }

    /// Dismiss the attempt. An in-flight stage is abandoned and nothing is
    /// persisted.
    pub fn cancel(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        info!("login attempt cancelled");
        self.cancel.cancel();
        self.pipeline.state().dismiss();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes once the attempt is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Tokens of a successful attempt.
    pub fn outcome(&self) -> Option<LoginOutcome> {
        self.outcome.lock().clone()
    }

    pub fn state(&self) -> LoginState {
        self.pipeline.state().current()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.pipeline.state().subscribe()
    }
}
