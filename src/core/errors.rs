/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type for blocking completion waits
pub type SyncResult<T> = Result<T, SyncError>;

/// Result type for criteria construction
pub type CriteriaResult<T> = Result<T, CriteriaError>;

/// Failure of a blocking `complete()` call
///
/// Timeout is the only way a wait fails. Panics raised by the wrapped routine
/// or by the condition predicate are not caught and unwind through `complete()`.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyncError {
    #[error("Wait timed out after {elapsed_ms}ms (timeout: {timeout_ms}ms)")]
    #[diagnostic(
        code(sync::timeout),
        help("No completion signal arrived in time. Raise the timeout or check that the routine completes its Completer.")
    )]
    Timeout { elapsed_ms: u64, timeout_ms: u64 },
}

impl SyncError {
    pub(crate) fn timeout(elapsed: Duration, timeout: Duration) -> Self {
        Self::Timeout {
            elapsed_ms: elapsed.as_millis() as u64,
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// Check if this is a timeout error
    #[inline(always)]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Wall-clock time spent waiting before the error was raised
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Timeout { elapsed_ms, .. } => Duration::from_millis(*elapsed_ms),
        }
    }

    /// Configured timeout that was exceeded
    pub fn configured_timeout(&self) -> Duration {
        match self {
            Self::Timeout { timeout_ms, .. } => Duration::from_millis(*timeout_ms),
        }
    }
}

/// Invalid completion criteria or criteria configuration
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum CriteriaError {
    #[error("Invalid timeout: {0}")]
    #[diagnostic(
        code(criteria::invalid_timeout),
        help("Timeout must be a positive, finite number of seconds.")
    )]
    InvalidTimeout(String),

    #[error("Invalid poll interval: {0}")]
    #[diagnostic(
        code(criteria::invalid_poll_interval),
        help("Poll interval must be greater than zero.")
    )]
    InvalidPollInterval(String),

    #[error("Invalid value {value:?} for environment variable {var}")]
    #[diagnostic(
        code(criteria::invalid_env),
        help("Unset the variable or give it a value of the expected type.")
    )]
    InvalidEnv { var: String, value: String },

    #[error("Malformed criteria config: {0}")]
    #[diagnostic(
        code(criteria::malformed_config),
        help("Expected a JSON object with optional timeout, callback, poll_interval_ms and strategy keys.")
    )]
    MalformedConfig(String),
}

impl From<serde_json::Error> for CriteriaError {
    fn from(err: serde_json::Error) -> Self {
        CriteriaError::MalformedConfig(err.to_string())
    }
}
