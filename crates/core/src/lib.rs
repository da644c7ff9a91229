//! # Inkstat Core
//!
//! Login business logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The token exchange pipeline and login state machine
//! - The credential store that owns the session credential
//! - Port interfaces (traits) for provider HTTP calls, persistence and cookies
//!
//! ## Architecture Principles
//! - Only depends on `inkstat-common` and `inkstat-domain`
//! - No HTTP, keychain or platform code
//! - All external dependencies via traits

pub mod auth;

pub use auth::ports::{CookiePurger, CredentialPersistence, TokenExchangeApi};
pub use auth::{
    CredentialStore, LoginDependencies, LoginSession, LoginStateMachine, NavigationOutcome,
    TokenExchangePipeline,
};
