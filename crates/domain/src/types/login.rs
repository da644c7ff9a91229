//! Login state and process-wide events

use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::impl_domain_status_conversions;

/// Position of a login attempt in the exchange chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    ExchangingSessionToken,
    ExchangingAccessToken,
    ExchangingWebServiceToken,
    Success,
    Error,
}

impl_domain_status_conversions!(PipelineStage {
    Idle => "idle",
    ExchangingSessionToken => "exchanging_session_token",
    ExchangingAccessToken => "exchanging_access_token",
    ExchangingWebServiceToken => "exchanging_web_service_token",
    Success => "success",
    Error => "error",
});

impl PipelineStage {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// Observable state of a single login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum LoginState {
    Idle,
    Loading(PipelineStage),
    Success,
    Error(ApiError),
}

impl Default for LoginState {
    fn default() -> Self {
        Self::Idle
    }
}

impl LoginState {
    /// Stage this state corresponds to.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Idle => PipelineStage::Idle,
            Self::Loading(stage) => *stage,
            Self::Success => PipelineStage::Success,
            Self::Error(_) => PipelineStage::Error,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.stage().is_terminal()
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Emitted once per successful login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginEvent {
    Succeeded,
}

/// Emitted by the credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEvent {
    SignedIn,
    /// Session credential and identity were removed together.
    LoggedOut,
}
