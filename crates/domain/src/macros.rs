//! Macro for implementing Display and FromStr for state enums
//!
//! # Example
//!
//! ```rust
//! use inkstat_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Waiting,
//!     Running,
//! }
//!
//! impl_domain_status_conversions!(Phase {
//!     Waiting => "waiting",
//!     Running => "running",
//! });
//!
//! assert_eq!(Phase::Running.to_string(), "running");
//! assert_eq!("WAITING".parse::<Phase>(), Ok(Phase::Waiting));
//! ```

/// Implements Display and FromStr for fieldless enums.
///
/// Parsing is case-insensitive; display uses the mapped string verbatim.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
