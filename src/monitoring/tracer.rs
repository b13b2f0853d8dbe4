/*!
 * Wait Tracing
 * Structured tracing for blocking completion waits using the tracing crate
 *
 * Features:
 * - Per-wait ID for correlating routine logs with the blocked caller
 * - JSON-formatted logs for structured parsing
 * - Outcome and duration recorded on the wait span
 */

use crate::core::limits::ENV_TRACE_JSON;
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SYNC_ADAPTER_TRACE_JSON: Enable JSON output (default: false)
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Generate a unique ID for one `complete()` call
pub fn generate_wait_id() -> String {
    Uuid::new_v4().to_string()
}

/// How a wait ended, as recorded on its span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    Callback,
    Condition,
    Timeout,
}

impl WaitOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Callback => "callback",
            Self::Condition => "condition",
            Self::Timeout => "timeout",
        }
    }
}

/// Span covering one blocking wait
///
/// Logs the outcome and duration when dropped.
pub(crate) struct WaitSpan {
    span: tracing::Span,
    start: Instant,
    wait_id: String,
    outcome: Option<WaitOutcome>,
}

impl WaitSpan {
    pub(crate) fn new(timeout: Duration, wait_for_callback: bool, has_condition: bool, strategy: &str) -> Self {
        let wait_id = generate_wait_id();

        let span = span!(
            Level::DEBUG,
            "synchronizer_complete",
            wait_id = %wait_id,
            timeout_ms = timeout.as_millis() as u64,
            wait_for_callback = wait_for_callback,
            has_condition = has_condition,
            strategy = strategy,
            outcome = tracing::field::Empty,
            elapsed_ms = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            wait_id,
            outcome: None,
        }
    }

    pub(crate) fn wait_id(&self) -> &str {
        &self.wait_id
    }

    /// Run `f` inside the wait span
    pub(crate) fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        self.span.in_scope(f)
    }

    pub(crate) fn record_outcome(&mut self, outcome: WaitOutcome) {
        self.span.record("outcome", outcome.as_str());
        self.outcome = Some(outcome);
    }
}

impl Drop for WaitSpan {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.span.record("elapsed_ms", elapsed.as_millis() as u64);
        let _entered = self.span.enter();

        match self.outcome {
            Some(WaitOutcome::Timeout) => warn!(
                wait_id = %self.wait_id,
                elapsed_ms = elapsed.as_millis() as u64,
                "wait timed out"
            ),
            Some(outcome) => debug!(
                wait_id = %self.wait_id,
                outcome = outcome.as_str(),
                elapsed_us = elapsed.as_micros() as u64,
                "wait satisfied"
            ),
            // Unwinding out of a panicking routine or condition
            None => warn!(wait_id = %self.wait_id, "wait abandoned without outcome"),
        }
    }
}
