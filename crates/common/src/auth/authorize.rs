//! Authorization URL construction

use inkstat_domain::{InkstatError, ProviderConfig, Result};
use url::Url;

use super::pkce::PkceChallenge;

/// Builder for the URL the embedded browser opens to start a login.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationRequest;

impl AuthorizationRequest {
    /// Combine the provider authorize endpoint with the login query.
    ///
    /// Values are percent-encoded by [`Url::query_pairs_mut`]. Parameters
    /// already present on the configured endpoint are kept.
    ///
    /// # Errors
    /// Returns [`InkstatError::Config`] if the configured endpoint is not an
    /// absolute URL.
    pub fn build(provider: &ProviderConfig, challenge: &PkceChallenge) -> Result<Url> {
        let mut url = Url::parse(&provider.authorize_url).map_err(|e| {
            InkstatError::Config(format!("invalid authorize_url '{}': {e}", provider.authorize_url))
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("state", &challenge.state)
                .append_pair("redirect_uri", &provider.redirect_uri())
                .append_pair("client_id", &provider.client_id)
                .append_pair("scope", &provider.scope)
                .append_pair("response_type", &provider.response_type)
                .append_pair(&provider.challenge_param, &challenge.code_challenge)
                .append_pair(&provider.challenge_method_param, challenge.challenge_method());

            for (key, value) in &provider.extra_params {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }
}
