//! # Inkstat Infrastructure
//!
//! Infrastructure implementations of the login pipeline ports.
//!
//! This crate contains:
//! - The HTTP client facade and its error classification
//! - The provider API client for the three token exchanges
//! - Keychain persistence and the shared cookie jar
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `inkstat-core`
//! - Depends on `inkstat-domain` and `inkstat-core`
//! - Contains all "impure" code (network, keychain, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use api::ProviderExchangeClient;
pub use errors::InfraError;
pub use http::{ApiRequest, HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
pub use storage::{KeychainCredentialStore, KeychainError, SessionCookieJar};
