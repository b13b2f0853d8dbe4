/*!
 * Completer
 *
 * The completion capability handed to a wrapped routine as its final
 * argument. Completing consumes the handle, so a routine can signal at most
 * once; the handle is `Send` and may travel to whatever thread finishes the
 * work.
 */

use crate::core::sync::CompletionCell;
use crate::monitoring::WaitMetrics;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// One-shot completion callback for a wrapped routine
pub struct Completer<T> {
    cell: Arc<CompletionCell<T>>,
    metrics: Option<Arc<WaitMetrics>>,
    completed: bool,
}

impl<T> Completer<T> {
    pub(crate) fn new(cell: Arc<CompletionCell<T>>, metrics: Option<Arc<WaitMetrics>>) -> Self {
        Self {
            cell,
            metrics,
            completed: false,
        }
    }

    /// Hand `value` to the waiting `complete()` call and wake it
    ///
    /// Safe to call from any thread. A value delivered after the wait has
    /// already timed out is dropped.
    pub fn complete(mut self, value: T) {
        self.completed = true;
        if let Some(metrics) = &self.metrics {
            metrics.inc_callbacks_fired();
        }
        if !self.cell.fill(value) {
            debug!("completion value discarded, cell already filled");
        }
    }

    /// Whether a `complete()` call is still blocked on this handle
    ///
    /// Turns false once the wait has returned (by any outcome), letting
    /// long-running routines skip work nobody will observe.
    pub fn is_waiting(&self) -> bool {
        Arc::strong_count(&self.cell) > 1
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if !self.completed {
            trace!(waiting = self.is_waiting(), "completer dropped without completing");
        }
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("completed", &self.completed)
            .field("waiting", &self.is_waiting())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_complete_fills_cell() {
        let cell = Arc::new(CompletionCell::new());
        let completer = Completer::new(cell.clone(), None);
        assert!(completer.is_waiting());

        completer.complete(42u32);
        assert!(cell.is_done());
        assert_eq!(cell.take(), Some(42));
    }

    #[test]
    fn test_complete_from_other_thread() {
        let cell = Arc::new(CompletionCell::new());
        let completer = Completer::new(cell.clone(), None);

        thread::spawn(move || completer.complete(String::from("ok")))
            .join()
            .unwrap();

        assert_eq!(cell.take().as_deref(), Some("ok"));
    }

    #[test]
    fn test_counts_fired_callbacks() {
        let metrics = Arc::new(WaitMetrics::new());
        let cell = Arc::new(CompletionCell::new());
        Completer::new(cell, Some(metrics.clone())).complete(());
        assert_eq!(metrics.snapshot().callbacks_fired, 1);
    }

    #[test]
    fn test_not_waiting_after_waiter_gone() {
        let cell = Arc::new(CompletionCell::<u8>::new());
        let completer = Completer::new(cell.clone(), None);
        drop(cell);
        assert!(!completer.is_waiting());
    }

    #[test]
    fn test_drop_without_completing_leaves_cell_empty() {
        let cell = Arc::new(CompletionCell::<u8>::new());
        drop(Completer::new(cell.clone(), None));
        assert!(!cell.is_done());
    }
}
