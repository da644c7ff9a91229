//! # Inkstat App
//!
//! Application layer - commands and composition root.
//!
//! This crate contains:
//! - Commands for the presentation layer (login, logout, account status)
//! - Application context (dependency injection)
//! - A terminal entry point that drives a login by hand
//!
//! ## Architecture
//! - Depends on `domain`, `common`, `core`, and `infra`
//! - Wires the ports in `inkstat-core` to the adapters in `inkstat-infra`

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
