//! Reusable utilities shared across Inkstat crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: login handshake helpers (PKCE, authorize URL, redirect
//!   interception)
//! - `runtime`: async observable state and event broadcast primitives

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod lifecycle;

// Re-export commonly used types for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use auth::{AuthorizationRequest, NavigationDecision, PkceChallenge, RedirectInterceptor};
#[cfg(feature = "runtime")]
pub use lifecycle::{EventBus, Observable};
