//! Token exchange pipeline
//!
//! ```text
//! code + verifier ─► session token ─► access token ─► web-service token
//!                         (1)              (2)               (3)
//! ```
//!
//! Stages run strictly in order, each consuming the previous output. The
//! first failure ends the run. Nothing is written to the credential store
//! until all three stages succeeded.

use std::future::Future;
use std::sync::Arc;

use inkstat_domain::{
    AccessGrant, ApiError, AuthorizationCode, CodeVerifier, LoginOutcome, PipelineStage,
    SessionToken, WebServiceToken,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::credential_store::CredentialStore;
use super::login_state::LoginStateMachine;
use super::ports::TokenExchangeApi;

type ApiResult<T> = std::result::Result<T, ApiError>;

pub struct TokenExchangePipeline {
    api: Arc<dyn TokenExchangeApi>,
    store: Arc<CredentialStore>,
    state: Arc<LoginStateMachine>,
}

impl TokenExchangePipeline {
    pub fn new(
        api: Arc<dyn TokenExchangeApi>,
        store: Arc<CredentialStore>,
        state: Arc<LoginStateMachine>,
    ) -> Self {
        Self { api, store, state }
    }

    pub fn state(&self) -> &Arc<LoginStateMachine> {
        &self.state
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Run the full chain for one login attempt.
    ///
    /// On success the session credential and identity are persisted and the
    /// state machine reaches `Success`. On failure the state machine records
    /// the error and nothing is persisted. On cancellation the attempt is
    /// dismissed without an error state and [`ApiError::Cancelled`] is
    /// returned.
    ///
    /// # Errors
    /// The classified error of the first failing stage.
    pub async fn run(
        &self,
        code: AuthorizationCode,
        verifier: CodeVerifier,
        cancel: CancellationToken,
    ) -> ApiResult<LoginOutcome> {
        match self.exchange(&code, &verifier, &cancel).await {
            Ok(outcome) => {
                if !self.persist(&outcome, &cancel).await {
                    self.state.dismiss();
                    return Err(ApiError::Cancelled);
                }
                if !self.state.succeed() {
                    debug!("attempt dismissed after its credential was stored");
                }
                Ok(outcome)
            }
            Err(ApiError::Cancelled) => {
                self.state.dismiss();
                Err(ApiError::Cancelled)
            }
            Err(err) => {
                self.state.fail(err.clone());
                Err(err)
            }
        }
    }

    /// Exchange the stored session credential for a new access and
    /// web-service token. Never runs on its own; callers decide when.
    ///
    /// # Errors
    /// [`ApiError::Authorization`] when no credential is stored, otherwise
    /// the classified error of the failing stage.
    pub async fn refresh(
        &self,
        cancel: &CancellationToken,
    ) -> ApiResult<(AccessGrant, WebServiceToken)> {
        let Some(session_token) = self.store.get() else {
            warn!("web service token refresh without session credential");
            return Err(ApiError::Authorization);
        };
        self.renew(&session_token, cancel).await
    }

    /// Re-run stages 2 and 3 from an existing session credential.
    ///
    /// Used to obtain a fresh web-service token without a new browser login.
    /// Does not touch the login state machine. The stored identity is
    /// refreshed on success.
    ///
    /// # Errors
    /// The classified error of the failing stage.
    pub async fn renew(
        &self,
        session_token: &SessionToken,
        cancel: &CancellationToken,
    ) -> ApiResult<(AccessGrant, WebServiceToken)> {
        let grant = self.access_stage(session_token, cancel).await?;
        let web_service_token = self.web_service_stage(&grant, cancel).await?;

        if let Err(err) = self.store.set_identity(grant.identity.clone()).await {
            warn!(error = %err, "failed to refresh stored identity");
        }
        Ok((grant, web_service_token))
    }

    async fn exchange(
        &self,
        code: &AuthorizationCode,
        verifier: &CodeVerifier,
        cancel: &CancellationToken,
    ) -> ApiResult<LoginOutcome> {
        self.state.advance(PipelineStage::ExchangingSessionToken);
        let session_token =
            guarded(cancel, self.api.exchange_session_token(code, verifier)).await?;
        if session_token.is_empty() {
            return Err(ApiError::malformed("session token", "empty session_token"));
        }

        self.state.advance(PipelineStage::ExchangingAccessToken);
        let grant = self.access_stage(&session_token, cancel).await?;

        self.state.advance(PipelineStage::ExchangingWebServiceToken);
        let web_service_token = self.web_service_stage(&grant, cancel).await?;

        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        Ok(LoginOutcome { session_token, grant, web_service_token })
    }

    async fn access_stage(
        &self,
        session_token: &SessionToken,
        cancel: &CancellationToken,
    ) -> ApiResult<AccessGrant> {
        if session_token.is_empty() {
            return Err(ApiError::malformed("session token", "empty session_token"));
        }
        let grant = guarded(cancel, self.api.exchange_access_token(session_token)).await?;
        if grant.access_token.is_empty() {
            return Err(ApiError::malformed("access token", "empty access token"));
        }
        debug!(account_id = %grant.identity.account_id, "access token obtained");
        Ok(grant)
    }

    async fn web_service_stage(
        &self,
        grant: &AccessGrant,
        cancel: &CancellationToken,
    ) -> ApiResult<WebServiceToken> {
        let token =
            guarded(cancel, self.api.exchange_web_service_token(&grant.access_token)).await?;
        if token.as_str().is_empty() {
            return Err(ApiError::malformed("web service token", "empty accessToken"));
        }
        Ok(token)
    }

    /// Hand the credential to the store unless the attempt was cancelled
    /// while waiting for the store. Returns whether the store took it.
    async fn persist(&self, outcome: &LoginOutcome, cancel: &CancellationToken) -> bool {
        let result = self
            .store
            .set_if(outcome.session_token.clone(), Some(outcome.grant.identity.clone()), || {
                !cancel.is_cancelled()
            })
            .await;
        match result {
            Ok(true) => {
                info!(account_id = %outcome.grant.identity.account_id, "login persisted");
                true
            }
            Ok(false) => {
                debug!("login cancelled before the credential was stored");
                false
            }
            Err(err) => {
                warn!(error = %err, "session credential kept in memory only");
                true
            }
        }
    }
}

/// Race one stage against cancellation.
async fn guarded<T, F>(cancel: &CancellationToken, stage: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ApiError::Cancelled),
        result = stage => result,
    }
}
