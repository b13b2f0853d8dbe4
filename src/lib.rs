/*!
 * Sync Adapter Library
 * Blocking calls over callback-style asynchronous routines
 */

pub mod core;
pub mod monitoring;
pub mod synchronizer;

// Re-exports
pub use crate::core::errors::{CriteriaError, CriteriaResult, SyncError, SyncResult};
pub use crate::core::sync::WaitStrategy;
pub use crate::monitoring::{init_tracing, WaitMetrics, WaitMetricsSnapshot};
pub use crate::synchronizer::routine;
pub use crate::synchronizer::{
    AsyncRoutine, Completer, Completion, CompletionCriteria, CriteriaBuilder, CriteriaConfig,
    Synchronizer,
};
