//! Credential and cookie storage adapters

pub mod cookies;
pub mod keychain;

pub use cookies::SessionCookieJar;
pub use keychain::{KeychainCredentialStore, KeychainError};
