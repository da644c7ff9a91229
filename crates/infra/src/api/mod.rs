//! Provider API client for the token exchange chain
//!
//! Three endpoints back the login pipeline:
//!
//! 1. session token (form body, plain JSON response)
//! 2. account login (JSON body, status envelope)
//! 3. web-service token (JSON body + bearer token, status envelope)
//!
//! All requests go through [`crate::http::HttpClient`], so transport and
//! status failures are already classified when they reach this module.

pub mod envelope;
pub mod exchange;

pub use envelope::Envelope;
pub use exchange::ProviderExchangeClient;
