/*!
 * Limits and Constants
 *
 * Default timing values for completion waits.
 */

use std::time::Duration;

// =============================================================================
// WAIT LIMITS
// =============================================================================

/// Default wall-clock timeout for `complete()` (10s)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default delay between completion checks (20ms)
/// Bounds the latency between a condition turning true and its detection.
/// Callback completions wake the loop immediately under the condvar strategy.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Largest timeout accepted as fractional seconds (one year)
/// Keeps `Duration::from_secs_f64` well inside its representable range
pub const MAX_TIMEOUT_SECS: f64 = 365.0 * 24.0 * 60.0 * 60.0;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Overrides the default timeout, in (fractional) seconds
pub const ENV_TIMEOUT_SECS: &str = "SYNC_ADAPTER_TIMEOUT_SECS";

/// Enables waiting for the routine's completion callback (`1`/`true`/`0`/`false`)
pub const ENV_WAIT_FOR_CALLBACK: &str = "SYNC_ADAPTER_WAIT_FOR_CALLBACK";

/// Overrides the poll interval, in milliseconds
pub const ENV_POLL_INTERVAL_MS: &str = "SYNC_ADAPTER_POLL_INTERVAL_MS";

/// Selects the pause strategy (`condvar` or `sleep`)
pub const ENV_STRATEGY: &str = "SYNC_ADAPTER_STRATEGY";

/// Switches tracing output to JSON
pub const ENV_TRACE_JSON: &str = "SYNC_ADAPTER_TRACE_JSON";
