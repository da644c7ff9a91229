//! Commands invoked by the presentation layer
//!
//! Every command logs its execution time and outcome. Errors are returned as
//! [`CommandError`], which serializes into a tagged object the UI can match on.

pub mod account;
pub mod login;

use inkstat_domain::{ApiError, InkstatError};
use serde::Serialize;
use thiserror::Error;

pub use account::{current_account, logout, refresh_web_service_token, AccountStatus, WebSession};
pub use login::{
    cancel_login, handle_navigation, login_status, start_login, wait_for_login, LoginStatus,
    NavigationResponse,
};

/// Error returned by commands.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CommandError {
    #[error("no login attempt in progress")]
    NoActiveLogin,

    #[error("timed out waiting for the login attempt")]
    Timeout,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    App(#[from] InkstatError),
}
