//! Credential and identity types
//!
//! Secret-bearing newtypes redact their `Debug` output so tokens never end up
//! in logs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

macro_rules! secret_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "(<redacted {} chars>)"), self.0.len())
            }
        }
    };
}

secret_newtype!(
    /// PKCE code verifier. Lives for one login attempt, never persisted.
    CodeVerifier
);

secret_newtype!(
    /// One-time code captured from the provider redirect.
    AuthorizationCode
);

secret_newtype!(
    /// Long-lived session credential owned by the credential store.
    SessionToken
);

secret_newtype!(
    /// Short-lived provider access token. Memory only.
    AccessToken
);

/// Account identity returned with the access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub account_id: String,
    pub nickname: Option<String>,
    /// Whether the account has linked game data.
    pub linked_game: bool,
}

/// Output of the access-token stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub access_token: AccessToken,
    pub identity: Identity,
}

/// Token for the first-party web API, with its server-reported lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct WebServiceToken {
    token: String,
    pub expires_in: u64,
    pub issued_at: DateTime<Utc>,
}

impl WebServiceToken {
    pub fn new(token: impl Into<String>, expires_in: u64) -> Self {
        Self { token: token.into(), expires_in, issued_at: Utc::now() }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        let secs = self.expires_in.min(u64::from(u32::MAX));
        self.issued_at
            .checked_add_signed(Duration::seconds(secs as i64))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the token has expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

impl std::fmt::Debug for WebServiceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebServiceToken")
            .field("token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Everything a successful login produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session_token: SessionToken,
    pub grant: AccessGrant,
    pub web_service_token: WebServiceToken,
}

/// Persisted form of the session credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub session_token: SessionToken,
    pub identity: Option<Identity>,
    pub stored_at: DateTime<Utc>,
}

impl StoredCredential {
    pub fn new(session_token: SessionToken, identity: Option<Identity>) -> Self {
        Self { session_token, identity, stored_at: Utc::now() }
    }
}

/// Consistent view of the credential store.
///
/// `identity` is never present without `session_token`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSnapshot {
    pub session_token: Option<SessionToken>,
    pub identity: Option<Identity>,
}

impl CredentialSnapshot {
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.session_token.is_some()
    }

    /// Whether there is anything a logout would remove.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.session_token.is_none() && self.identity.is_none()
    }
}

impl From<StoredCredential> for CredentialSnapshot {
    fn from(stored: StoredCredential) -> Self {
        Self { session_token: Some(stored.session_token), identity: stored.identity }
    }
}
