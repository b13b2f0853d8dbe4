/*!
 * Invocation State
 * Per-call state owned by one `complete()` invocation
 */

use super::completer::Completer;
use crate::core::sync::CompletionCell;
use crate::monitoring::WaitMetrics;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Start time plus the completion slot shared with a single `Completer`
pub(crate) struct InvocationState<T> {
    cell: Arc<CompletionCell<T>>,
    started: Instant,
}

impl<T> InvocationState<T> {
    /// Record the start time; must run before the routine launches
    pub(crate) fn start() -> Self {
        Self {
            cell: Arc::new(CompletionCell::new()),
            started: Instant::now(),
        }
    }

    #[inline]
    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn completer(&self, metrics: Option<Arc<WaitMetrics>>) -> Completer<T> {
        Completer::new(self.cell.clone(), metrics)
    }

    #[inline]
    pub(crate) fn cell(&self) -> &CompletionCell<T> {
        &self.cell
    }

    /// Value passed to the completion callback, if it has fired
    #[inline]
    pub(crate) fn take_result(&self) -> Option<T> {
        self.cell.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completer_feeds_state() {
        let state = InvocationState::start();
        assert_eq!(state.take_result(), None);

        state.completer(None).complete("done");
        assert!(state.cell().is_done());
        assert_eq!(state.take_result(), Some("done"));
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let state = InvocationState::<()>::start();
        let first = state.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert!(state.elapsed() > first);
    }
}
