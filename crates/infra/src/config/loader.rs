//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Start from [`Config::default`] (the production provider settings)
//! 2. If a config file is found, it replaces the defaults it mentions
//! 3. `INKSTAT_*` environment variables override both
//!
//! ## Environment Variables
//! - `INKSTAT_CLIENT_ID`: OAuth client id
//! - `INKSTAT_REDIRECT_SCHEME`: custom URI scheme of the redirect
//! - `INKSTAT_AUTHORIZE_URL`, `INKSTAT_SESSION_TOKEN_URL`,
//!   `INKSTAT_ACCESS_TOKEN_URL`, `INKSTAT_WEB_SERVICE_TOKEN_URL`: endpoints
//! - `INKSTAT_GAME_ID`: game id sent with the web-service token request
//! - `INKSTAT_COOKIE_DOMAIN`: domain purged on logout
//! - `INKSTAT_HTTP_TIMEOUT_SECS`: request timeout
//! - `INKSTAT_HTTP_MAX_ATTEMPTS`: attempts for idempotent requests
//! - `INKSTAT_USER_AGENT`: user agent header
//! - `INKSTAT_KEYCHAIN_SERVICE`, `INKSTAT_KEYCHAIN_ACCOUNT`: keychain entry
//! - `INKSTAT_LOG_LEVEL`: default log level when `RUST_LOG` is unset
//! - `INKSTAT_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` or `./inkstat.{json,toml}` (current working directory)
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use inkstat_domain::{Config, InkstatError, Result};

/// Load configuration from defaults, an optional file and the environment.
///
/// A missing config file is not an error; an unreadable or invalid one is.
///
/// # Errors
/// Returns `InkstatError::Config` if the file cannot be parsed or an
/// environment variable has an invalid value.
pub fn load() -> Result<Config> {
    let base = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("no config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(base)
}

/// Defaults overridden by environment variables only.
///
/// # Errors
/// Returns `InkstatError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    apply_env_overrides(Config::default())
}

/// Apply every `INKSTAT_*` variable that is set on top of `config`.
///
/// # Errors
/// Returns `InkstatError::Config` if a numeric variable does not parse.
pub fn apply_env_overrides(mut config: Config) -> Result<Config> {
    let provider = &mut config.provider;
    override_string(&mut provider.client_id, "INKSTAT_CLIENT_ID");
    override_string(&mut provider.redirect_scheme, "INKSTAT_REDIRECT_SCHEME");
    override_string(&mut provider.authorize_url, "INKSTAT_AUTHORIZE_URL");
    override_string(&mut provider.session_token_url, "INKSTAT_SESSION_TOKEN_URL");
    override_string(&mut provider.access_token_url, "INKSTAT_ACCESS_TOKEN_URL");
    override_string(&mut provider.web_service_token_url, "INKSTAT_WEB_SERVICE_TOKEN_URL");
    override_string(&mut provider.cookie_domain, "INKSTAT_COOKIE_DOMAIN");
    if let Some(game_id) = env_parse("INKSTAT_GAME_ID")? {
        provider.game_id = game_id;
    }

    if let Some(timeout) = env_parse("INKSTAT_HTTP_TIMEOUT_SECS")? {
        config.http.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse::<u32>("INKSTAT_HTTP_MAX_ATTEMPTS")? {
        config.http.max_attempts = attempts.max(1);
    }
    override_string(&mut config.http.user_agent, "INKSTAT_USER_AGENT");

    override_string(&mut config.storage.keychain_service, "INKSTAT_KEYCHAIN_SERVICE");
    override_string(&mut config.storage.keychain_account, "INKSTAT_KEYCHAIN_ACCOUNT");

    override_string(&mut config.logging.level, "INKSTAT_LOG_LEVEL");
    config.logging.json = env_bool("INKSTAT_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `InkstatError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(InkstatError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            InkstatError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| InkstatError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content; format is detected by file
/// extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| InkstatError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| InkstatError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(InkstatError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("inkstat.json"),
        dir.join("inkstat.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Non-empty value of an environment variable
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn override_string(target: &mut String, key: &str) {
    if let Some(value) = env_var(key) {
        *target = value;
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| InkstatError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    env_var(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
