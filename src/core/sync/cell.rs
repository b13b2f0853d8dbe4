/*!
 * Completion Cell
 *
 * Single-slot, write-once handoff between a completing routine and the
 * thread blocked in `complete()`.
 *
 * # Design: Mutex + Condvar + Atomic Flag
 *
 * The value lives behind a `parking_lot::Mutex` and the writer notifies a
 * `parking_lot::Condvar`, so a waiter parked in `wait_for` wakes as soon as
 * the value lands. The `done` flag mirrors "slot filled" for lock-free
 * `is_done` checks from the poll loop.
 *
 * Filled-state checks and the condvar wait happen under the same lock, so a
 * fill that races with a waiter about to park is never lost.
 */

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Write-once slot with timed wait
#[repr(C, align(64))] // Cache-line aligned to prevent false sharing
pub struct CompletionCell<T> {
    value: Mutex<Option<T>>,
    condvar: Condvar,
    done: AtomicBool,
}

impl<T> CompletionCell<T> {
    /// Create an empty cell
    pub const fn new() -> Self {
        Self {
            value: Mutex::new(None),
            condvar: Condvar::new(),
            done: AtomicBool::new(false),
        }
    }

    /// Store `value` and wake the waiter
    ///
    /// Returns `false` (dropping `value`) if the cell was already filled.
    pub fn fill(&self, value: T) -> bool {
        let mut slot = self.value.lock();
        if self.done.load(Ordering::Acquire) {
            return false;
        }
        *slot = Some(value);
        self.done.store(true, Ordering::Release);
        drop(slot);

        self.condvar.notify_all();
        true
    }

    /// Whether a value has been stored (it may since have been taken)
    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Move the stored value out, if any
    pub fn take(&self) -> Option<T> {
        if !self.is_done() {
            return None;
        }
        self.value.lock().take()
    }

    /// Park until the cell is filled or `timeout` elapses
    ///
    /// Returns `true` if the cell is filled on return. Spurious wakeups
    /// surface as an early `false`; callers re-check in their own loop.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let mut slot = self.value.lock();
        if self.done.load(Ordering::Acquire) {
            return true;
        }
        if timeout.is_zero() {
            return false;
        }
        let _ = self.condvar.wait_for(&mut slot, timeout);
        self.done.load(Ordering::Acquire)
    }
}

impl<T> Default for CompletionCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for CompletionCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionCell")
            .field("done", &self.is_done())
            .finish()
    }
}
