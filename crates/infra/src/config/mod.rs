//! Configuration loading
//!
//! Layers defaults, an optional JSON/TOML file and `INKSTAT_*` environment
//! variables into one [`inkstat_domain::Config`].

pub mod loader;

pub use loader::{apply_env_overrides, load, load_from_env, load_from_file, probe_config_paths};
