//! Signed-in account commands

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use inkstat_core::{LoginStateMachine, TokenExchangePipeline};
use inkstat_domain::{ApiError, Identity};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::CommandError;
use crate::context::AppContext;
use crate::utils::logging::{api_error_label, error_label, log_command_execution};

/// Who is signed in, if anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountStatus {
    pub signed_in: bool,
    pub identity: Option<Identity>,
}

/// Fresh web-service token for the first-party web API.
#[derive(Clone, Serialize)]
pub struct WebSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account_id: String,
}

impl std::fmt::Debug for WebSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSession")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("account_id", &self.account_id)
            .finish()
    }
}

pub fn current_account(ctx: &Arc<AppContext>) -> AccountStatus {
    let snapshot = ctx.credentials.snapshot();
    AccountStatus { signed_in: snapshot.is_signed_in(), identity: snapshot.identity }
}

/// Sign out: cancel any login in progress, then clear the credential,
/// identity and provider cookies.
///
/// Returns whether anyone was signed in.
///
/// # Errors
/// Returns [`CommandError::App`] if the keychain record could not be
/// deleted. The in-memory state is cleared regardless.
pub async fn logout(ctx: &Arc<AppContext>) -> Result<bool, CommandError> {
    let command_name = "account::logout";
    let start = Instant::now();

    if let Some(session) = ctx.replace_login(None) {
        session.cancel();
    }

    let result = ctx.credentials.clear().await.map_err(|err| {
        warn!(error_type = error_label(&err), "logout could not delete keychain record");
        CommandError::from(err)
    });

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

/// Exchange the stored session credential for a new web-service token.
///
/// Only runs when called; nothing refreshes tokens in the background.
///
/// # Errors
/// - [`ApiError::Authorization`] when nobody is signed in or the provider
///   rejects the credential
/// - the classified error of the failing exchange otherwise
pub async fn refresh_web_service_token(ctx: &Arc<AppContext>) -> Result<WebSession, CommandError> {
    let command_name = "account::refresh_web_service_token";
    let start = Instant::now();

    let result = renew(ctx).await.map_err(|err| {
        warn!(error_type = api_error_label(&err), "web service token refresh failed");
        CommandError::from(err)
    });

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

async fn renew(ctx: &AppContext) -> Result<WebSession, ApiError> {
    let state = Arc::new(LoginStateMachine::new(ctx.login_events.clone()));
    let pipeline = TokenExchangePipeline::new(ctx.api(), Arc::clone(&ctx.credentials), state);
    let (grant, token) = pipeline.refresh(&CancellationToken::new()).await?;

    Ok(WebSession {
        token: token.as_str().to_string(),
        expires_at: token.expires_at(),
        account_id: grant.identity.account_id,
    })
}
