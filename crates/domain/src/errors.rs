//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Inkstat
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum InkstatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Inkstat operations
pub type Result<T> = std::result::Result<T, InkstatError>;

/// Message key shown when the account has no linked game data.
pub const MISSING_GAME_DATA_MESSAGE_KEY: &str = "user_game_data_not_exist_message";

/// Message key shown for every other login failure.
pub const LOGIN_FAILED_MESSAGE_KEY: &str = "login_error_message";

/// Structured failure reported by the account provider inside a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ProviderErrorReason {
    /// The account exists but has never linked the game.
    MissingGameData,
    /// Any other provider status code.
    Other { code: i64, message: String },
}

impl std::fmt::Display for ProviderErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingGameData => write!(f, "account has no linked game data"),
            Self::Other { code, message } => write!(f, "provider status {code}: {message}"),
        }
    }
}

/// Categories of API errors, used for log labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// No response reached the client
    Transport,
    /// 403 - credential invalid or expired
    Authorization,
    /// 400 - malformed request (client defect)
    RequestParameter,
    /// Structured error payload from the provider
    Provider,
    /// Anything else non-2xx or undecodable
    Unknown,
    /// Attempt dismissed by the user
    Cancelled,
}

/// Classified outcome of a failed API round trip.
///
/// Every exchange stage surfaces one of these unchanged up to the login state
/// machine.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum ApiError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Authorization rejected")]
    Authorization,

    #[error("Request parameters rejected")]
    RequestParameter,

    #[error("Provider error: {0}")]
    ProviderDomain(ProviderErrorReason),

    #[error("API error: {0}")]
    UnknownApi(String),

    #[error("Login cancelled")]
    Cancelled,
}

impl ApiError {
    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Transport(_) => ApiErrorCategory::Transport,
            Self::Authorization => ApiErrorCategory::Authorization,
            Self::RequestParameter => ApiErrorCategory::RequestParameter,
            Self::ProviderDomain(_) => ApiErrorCategory::Provider,
            Self::UnknownApi(_) => ApiErrorCategory::Unknown,
            Self::Cancelled => ApiErrorCategory::Cancelled,
        }
    }

    /// Stable label for logs
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self.category() {
            ApiErrorCategory::Transport => "transport",
            ApiErrorCategory::Authorization => "authorization",
            ApiErrorCategory::RequestParameter => "request_parameter",
            ApiErrorCategory::Provider => "provider",
            ApiErrorCategory::Unknown => "unknown",
            ApiErrorCategory::Cancelled => "cancelled",
        }
    }

    /// Whether the error means the account has no linked game data.
    #[must_use]
    pub fn is_missing_game_data(&self) -> bool {
        matches!(self, Self::ProviderDomain(ProviderErrorReason::MissingGameData))
    }

    /// Localization key the presentation layer shows for this failure.
    #[must_use]
    pub fn user_message_key(&self) -> &'static str {
        if self.is_missing_game_data() {
            MISSING_GAME_DATA_MESSAGE_KEY
        } else {
            LOGIN_FAILED_MESSAGE_KEY
        }
    }

    /// Malformed or undecodable response body.
    pub fn malformed(context: &str, detail: impl std::fmt::Display) -> Self {
        Self::UnknownApi(format!("malformed {context} response: {detail}"))
    }
}

impl From<ApiError> for InkstatError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(msg) => Self::Network(msg),
            ApiError::Authorization => Self::Auth("authorization rejected".into()),
            ApiError::RequestParameter => Self::InvalidInput("request parameters rejected".into()),
            other => Self::Auth(other.to_string()),
        }
    }
}
