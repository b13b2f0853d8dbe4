/*!
 * Monitoring Module
 * Structured tracing and wait metrics
 */

mod metrics;
mod tracer;

pub use metrics::{WaitMetrics, WaitMetricsSnapshot};
pub use tracer::{generate_wait_id, init_tracing};

pub(crate) use tracer::{WaitOutcome, WaitSpan};
