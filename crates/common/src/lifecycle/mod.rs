//! Async state and event primitives
//!
//! - **[`state`]**: single-writer observable values backed by `tokio::sync::watch`
//! - **[`events`]**: process-wide broadcast of one-shot notifications

pub mod events;
pub mod state;

pub use events::EventBus;
pub use state::Observable;
