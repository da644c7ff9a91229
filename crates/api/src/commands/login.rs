//! Login commands: open the provider page, feed it browser navigations,
//! observe or cancel the attempt.

use std::sync::Arc;
use std::time::{Duration, Instant};

use inkstat_core::{LoginSession, NavigationOutcome};
use inkstat_domain::LoginState;
use serde::Serialize;
use tracing::{debug, info};

use super::CommandError;
use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Login state as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginStatus {
    pub state: LoginState,
    /// Localization key of the message to show, set only for errors.
    pub message_key: Option<&'static str>,
}

impl From<LoginState> for LoginStatus {
    fn from(state: LoginState) -> Self {
        let message_key = state.error().map(inkstat_domain::ApiError::user_message_key);
        Self { state, message_key }
    }
}

/// What the embedded browser should do with a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationResponse {
    pub cancel_navigation: bool,
    pub exchange_started: bool,
}

/// Begin a new login attempt and return the authorize URL to load.
///
/// Any attempt still in progress is cancelled first.
///
/// # Errors
/// Returns [`CommandError::App`] if the provider configuration is invalid.
pub fn start_login(ctx: &Arc<AppContext>) -> Result<String, CommandError> {
    let command_name = "login::start_login";
    let start = Instant::now();

    let result = open_login(ctx);

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

fn open_login(ctx: &AppContext) -> Result<String, CommandError> {
    let deps = ctx.login_dependencies()?;
    let (session, url) = LoginSession::start(&ctx.config.provider, deps)?;
    if let Some(previous) = ctx.replace_login(Some(session)) {
        debug!("replacing unfinished login attempt");
        previous.cancel();
    }
    info!("login attempt opened");
    Ok(url.to_string())
}

/// Hand a navigation of the embedded browser to the active attempt.
///
/// # Errors
/// Returns [`CommandError::NoActiveLogin`] when no attempt was started.
pub fn handle_navigation(
    ctx: &Arc<AppContext>,
    url: &str,
) -> Result<NavigationResponse, CommandError> {
    let command_name = "login::handle_navigation";
    let start = Instant::now();

    let result = ctx.active_login().ok_or(CommandError::NoActiveLogin).map(|session| {
        let outcome = session.handle_navigation(url);
        NavigationResponse {
            cancel_navigation: outcome.cancels_navigation(),
            // The exchange keeps running on its own task; progress is
            // reported through the login state.
            exchange_started: matches!(outcome, NavigationOutcome::Started(_)),
        }
    });

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

/// Dismiss the active attempt. Returns `false` when there was none.
pub fn cancel_login(ctx: &Arc<AppContext>) -> bool {
    let command_name = "login::cancel_login";
    let start = Instant::now();

    let cancelled = match ctx.replace_login(None) {
        Some(session) => {
            session.cancel();
            true
        }
        None => false,
    };

    log_command_execution(command_name, start.elapsed(), true);
    cancelled
}

/// Current state of the active attempt, `Idle` when there is none.
pub fn login_status(ctx: &Arc<AppContext>) -> LoginStatus {
    ctx.active_login().map(|session| session.state()).unwrap_or_default().into()
}

/// Wait until the active attempt succeeds, fails or is cancelled.
///
/// # Errors
/// - [`CommandError::NoActiveLogin`] when no attempt was started
/// - [`CommandError::Timeout`] when the attempt does not settle in time
pub async fn wait_for_login(
    ctx: &Arc<AppContext>,
    timeout: Duration,
) -> Result<LoginStatus, CommandError> {
    let command_name = "login::wait_for_login";
    let start = Instant::now();

    let result = match ctx.active_login() {
        None => Err(CommandError::NoActiveLogin),
        Some(session) => {
            let mut rx = session.subscribe();
            let settled = tokio::time::timeout(timeout, async {
                tokio::select! {
                    state = rx.wait_for(LoginState::is_terminal) => state.ok().map(|s| s.clone()),
                    () = session.cancelled() => None,
                }
            })
            .await;

            match settled {
                Ok(Some(state)) => Ok(LoginStatus::from(state)),
                // Cancelled, or the state sender is gone.
                Ok(None) => Ok(LoginStatus::from(session.state())),
                Err(_) => Err(CommandError::Timeout),
            }
        }
    };

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}
