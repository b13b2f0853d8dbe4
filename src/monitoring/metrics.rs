/*!
 * Wait Metrics
 * Lock-free counters for blocking completion waits
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Atomic wait statistics, shareable across Synchronizers via `Arc`
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - Relaxed ordering; snapshots are approximate under concurrent updates
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct WaitMetrics {
    waits_started: AtomicU64,
    callback_completions: AtomicU64,
    condition_completions: AtomicU64,
    timeouts: AtomicU64,
    pauses: AtomicU64,
    callbacks_fired: AtomicU64,
    total_wait_us: AtomicU64,
}

impl WaitMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub(crate) fn inc_waits_started(&self) {
        self.waits_started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn inc_callback_completions(&self) {
        self.callback_completions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn inc_condition_completions(&self) {
        self.condition_completions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn inc_timeouts(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Hot path - called once per poll iteration
    #[inline(always)]
    pub(crate) fn inc_pauses(&self) {
        self.pauses.fetch_add(1, Ordering::Relaxed);
    }

    /// Called from the routine's thread when it completes its Completer
    #[inline(always)]
    pub(crate) fn inc_callbacks_fired(&self) {
        self.callbacks_fired.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn add_wait_time(&self, elapsed: Duration) {
        self.total_wait_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> WaitMetricsSnapshot {
        WaitMetricsSnapshot {
            waits_started: self.waits_started.load(Ordering::Relaxed),
            callback_completions: self.callback_completions.load(Ordering::Relaxed),
            condition_completions: self.condition_completions.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            pauses: self.pauses.load(Ordering::Relaxed),
            callbacks_fired: self.callbacks_fired.load(Ordering::Relaxed),
            total_wait_us: self.total_wait_us.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of `WaitMetrics`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaitMetricsSnapshot {
    pub waits_started: u64,
    pub callback_completions: u64,
    pub condition_completions: u64,
    pub timeouts: u64,
    pub pauses: u64,
    pub callbacks_fired: u64,
    pub total_wait_us: u64,
}

impl WaitMetricsSnapshot {
    /// Waits that ended, by any outcome
    pub fn finished(&self) -> u64 {
        self.callback_completions + self.condition_completions + self.timeouts
    }

    /// Mean time spent blocked per finished wait
    pub fn mean_wait(&self) -> Option<Duration> {
        match self.finished() {
            0 => None,
            n => Some(Duration::from_micros(self.total_wait_us / n)),
        }
    }
}
