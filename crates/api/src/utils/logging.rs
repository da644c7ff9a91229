use std::time::Duration;

use inkstat_domain::{ApiError, InkstatError};
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"login::start_login"`).
/// * `elapsed` - Duration the command execution took.
/// * `success` - Whether the command completed successfully.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, success: bool) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, "command_execution_failure");
    }
}

/// Convert an `InkstatError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &InkstatError) -> &'static str {
    match error {
        InkstatError::Config(_) => "config",
        InkstatError::Network(_) => "network",
        InkstatError::Auth(_) => "auth",
        InkstatError::Storage(_) => "storage",
        InkstatError::NotFound(_) => "not_found",
        InkstatError::InvalidInput(_) => "invalid_input",
        InkstatError::Internal(_) => "internal",
    }
}

/// Label for a classified provider error.
#[inline]
pub fn api_error_label(error: &ApiError) -> &'static str {
    error.label()
}
