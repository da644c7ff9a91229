//! Status envelope wrapped around provider API results

use inkstat_domain::constants::{PROVIDER_STATUS_MISSING_GAME_DATA, PROVIDER_STATUS_OK};
use inkstat_domain::{ApiError, ProviderErrorReason};
use serde::Deserialize;

/// `{ "status": 0, "result": {...} }` or `{ "status": <code>, "errorMessage": "..." }`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: i64,
    pub result: Option<T>,
    #[serde(default, rename = "errorMessage")]
    pub error_message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the result, mapping provider status codes to [`ApiError`].
    ///
    /// # Errors
    /// - [`ProviderErrorReason::MissingGameData`] for the no-linked-game status
    /// - [`ProviderErrorReason::Other`] for any other non-zero status
    /// - [`ApiError::UnknownApi`] when a successful envelope carries no result
    pub fn into_result(self, context: &str) -> Result<T, ApiError> {
        match self.status {
            PROVIDER_STATUS_OK => {
                self.result.ok_or_else(|| ApiError::malformed(context, "missing result"))
            }
            PROVIDER_STATUS_MISSING_GAME_DATA => {
                Err(ApiError::ProviderDomain(ProviderErrorReason::MissingGameData))
            }
            code => Err(ApiError::ProviderDomain(ProviderErrorReason::Other {
                code,
                message: self.error_message.unwrap_or_default(),
            })),
        }
    }
}
