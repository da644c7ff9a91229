//! Account login: exchange chain, login state and credential ownership
//!
//! ```text
//! LoginSession ──► TokenExchangePipeline ──► TokenExchangeApi (port)
//!      │                  │
//!      │                  ├──► LoginStateMachine  (observable state)
//!      │                  └──► CredentialStore    (persistence + cookie ports)
//!      └──► RedirectInterceptor (once per attempt)
//! ```

pub mod credential_store;
pub mod login_state;
pub mod pipeline;
pub mod ports;
pub mod session;

pub use credential_store::CredentialStore;
pub use login_state::LoginStateMachine;
pub use pipeline::TokenExchangePipeline;
pub use ports::{CookiePurger, CredentialPersistence, TokenExchangeApi};
pub use session::{LoginDependencies, LoginSession, NavigationOutcome};
