//! Port interfaces for the login pipeline
//!
//! These traits define the boundaries between the exchange chain and the
//! infrastructure that talks to the provider and the device keychain.

use async_trait::async_trait;
use inkstat_domain::{
    AccessGrant, AccessToken, ApiError, AuthorizationCode, CodeVerifier, Result, SessionToken,
    StoredCredential, WebServiceToken,
};

/// The three provider round trips of the exchange chain.
///
/// Each call performs exactly one request and surfaces the classified error
/// unchanged. Implementations never retry.
#[async_trait]
pub trait TokenExchangeApi: Send + Sync {
    /// Stage 1: authorization code + PKCE verifier to session credential.
    async fn exchange_session_token(
        &self,
        code: &AuthorizationCode,
        verifier: &CodeVerifier,
    ) -> std::result::Result<SessionToken, ApiError>;

    /// Stage 2: session credential to access token and account identity.
    async fn exchange_access_token(
        &self,
        session_token: &SessionToken,
    ) -> std::result::Result<AccessGrant, ApiError>;

    /// Stage 3: access token to web-service token.
    async fn exchange_web_service_token(
        &self,
        access_token: &AccessToken,
    ) -> std::result::Result<WebServiceToken, ApiError>;
}

/// Durable storage for the session credential
#[async_trait]
pub trait CredentialPersistence: Send + Sync {
    /// Load the stored credential, `None` when nothing is stored
    async fn load(&self) -> Result<Option<StoredCredential>>;

    /// Replace the stored credential
    async fn save(&self, credential: &StoredCredential) -> Result<()>;

    /// Remove the stored credential. Succeeds when nothing is stored.
    async fn delete(&self) -> Result<()>;
}

/// Cookie storage that can drop everything for a domain
pub trait CookiePurger: Send + Sync {
    /// Remove cookies for `domain` and its subdomains, returning how many
    /// were dropped.
    fn purge_domain(&self, domain: &str) -> usize;
}
