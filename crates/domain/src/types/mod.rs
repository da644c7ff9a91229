//! Domain types and models

pub mod auth;
pub mod login;

pub use auth::{
    AccessGrant, AccessToken, AuthorizationCode, CodeVerifier, CredentialSnapshot, Identity,
    LoginOutcome, SessionToken, StoredCredential, WebServiceToken,
};
pub use login::{CredentialEvent, LoginEvent, LoginState, PipelineStage};
