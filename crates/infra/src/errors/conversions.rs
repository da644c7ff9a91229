//! Conversions from external infrastructure errors into domain errors.

use inkstat_domain::{ApiError, InkstatError};
use keyring::Error as KeyringError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub InkstatError);

impl From<InfraError> for InkstatError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<InkstatError> for InfraError {
    fn from(value: InkstatError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoInkstatError {
    fn into_inkstat(self) -> InkstatError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → InkstatError */
/* -------------------------------------------------------------------------- */

impl IntoInkstatError for KeyringError {
    fn into_inkstat(self) -> InkstatError {
        use KeyringError::*;

        let description = self.to_string();

        match self {
            NoEntry => InkstatError::NotFound("keychain entry not found".into()),
            BadEncoding(_) => {
                InkstatError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => InkstatError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                InkstatError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            PlatformFailure(err) => InkstatError::Storage(format!("keychain platform error: {err}")),
            NoStorageAccess(err) => {
                InkstatError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => InkstatError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_inkstat())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → InkstatError */
/* -------------------------------------------------------------------------- */

impl IntoInkstatError for HttpError {
    fn into_inkstat(self) -> InkstatError {
        if self.is_builder() {
            return InkstatError::Config(format!("invalid HTTP client configuration: {self}"));
        }
        InkstatError::from(classify_transport(&self))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_inkstat())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → InkstatError */
/* -------------------------------------------------------------------------- */

impl IntoInkstatError for JsonError {
    fn into_inkstat(self) -> InkstatError {
        InkstatError::Storage(format!("stored credential is not valid JSON: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_inkstat())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

/// Classify a reqwest failure that produced no usable response.
pub(crate) fn classify_transport(err: &HttpError) -> ApiError {
    if err.is_timeout() {
        return ApiError::Transport("HTTP request timed out".into());
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return ApiError::Transport("HTTP connection failure".into());
    }

    if let Some(status) = err.status() {
        return classify_status(status.as_u16(), status.canonical_reason());
    }

    ApiError::Transport(err.to_string())
}

/// Classify a non-2xx status code.
pub(crate) fn classify_status(code: u16, reason: Option<&str>) -> ApiError {
    match code {
        403 => ApiError::Authorization,
        400 => ApiError::RequestParameter,
        _ => ApiError::UnknownApi(format!("HTTP {code} {}", reason.unwrap_or("unknown status"))),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
