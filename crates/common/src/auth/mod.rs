//! Login handshake helpers
//!
//! Pure building blocks for the browser half of the login flow:
//!
//! ```text
//! PkceChallenge ──► AuthorizationRequest::build ──► (embedded browser)
//!                                                          │
//!      code ◄── RedirectInterceptor::intercept ◄──────────┘
//! ```
//!
//! Nothing in here performs I/O. The exchange chain that consumes the
//! captured code lives in `inkstat-core`.

pub mod authorize;
pub mod pkce;
pub mod redirect;

pub use authorize::AuthorizationRequest;
pub use pkce::{generate_code_challenge, generate_code_verifier, generate_state, PkceChallenge};
pub use redirect::{extract_code, NavigationDecision, RedirectInterceptor};
