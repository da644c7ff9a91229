//! # Inkstat Domain
//!
//! Business domain types for the Inkstat account login pipeline.
//!
//! This crate contains:
//! - Token, identity and login state types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Provider constants
//!
//! ## Architecture
//! - No dependencies on other Inkstat crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
