/*!
 * Synchronizer
 *
 * Turns a callback-style asynchronous routine into a blocking call.
 *
 * ## Poll Loop
 *
 * Each iteration checks, in fixed order:
 *
 * 1. **Timeout**: elapsed past the timeout fails the wait, even if a signal is ready
 * 2. **Callback**: if waiting for it and the Completer fired, return its value
 * 3. **Condition**: if configured and true, return `Completion::Condition`
 *
 * then pauses for at most one poll interval (never past the deadline). Under
 * the condvar strategy a Completer firing cuts the pause short. With no signal
 * configured the loop sleeps straight to the deadline (pure delay mode).
 *
 * ## Example
 *
 * ```
 * use sync_adapter::{Completer, Completion, CompletionCriteria, Synchronizer};
 * use std::thread;
 * use std::time::Duration;
 *
 * let criteria = CompletionCriteria::on_callback(Duration::from_secs(2)).unwrap();
 * let sync = Synchronizer::new(
 *     |x: u32, done: Completer<u32>| {
 *         thread::spawn(move || done.complete(x * 2));
 *     },
 *     21,
 *     criteria,
 * );
 *
 * assert_eq!(sync.complete().unwrap(), Completion::Callback(42));
 * ```
 */

use super::criteria::CompletionCriteria;
use super::routine::{bind, AsyncRoutine, Bound};
use super::completer::Completer;
use super::state::InvocationState;
use crate::core::errors::{SyncError, SyncResult};
use crate::core::sync::WaitStrategy;
use crate::monitoring::{WaitMetrics, WaitOutcome, WaitSpan};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The signal that satisfied a wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    /// The routine completed its Completer with this value
    Callback(T),
    /// The configured condition held
    Condition,
}

impl<T> Completion<T> {
    /// Callback value, `None` for a condition completion
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Callback(value) => Some(value),
            Self::Condition => None,
        }
    }

    #[inline]
    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_))
    }

    #[inline]
    pub fn is_condition(&self) -> bool {
        matches!(self, Self::Condition)
    }
}

/// Blocking adapter around one launch of an asynchronous routine
///
/// Single use: `complete` consumes the synchronizer. Build a new one per wait.
///
/// # Type Parameters
///
/// - `R`: the routine (`AsyncRoutine<A, T>`)
/// - `A`: arguments passed to the routine ahead of its `Completer`
/// - `T`: value the routine completes with
pub struct Synchronizer<R, A, T> {
    routine: R,
    args: A,
    criteria: CompletionCriteria,
    metrics: Option<Arc<WaitMetrics>>,
    _result: PhantomData<fn() -> T>,
}

impl<R, A, T> Synchronizer<R, A, T>
where
    R: AsyncRoutine<A, T>,
{
    /// Wrap `routine`, to be invoked as `routine(args, completer)`
    pub fn new(routine: R, args: A, criteria: CompletionCriteria) -> Self {
        Self {
            routine,
            args,
            criteria,
            metrics: None,
            _result: PhantomData,
        }
    }

    /// Record outcomes into shared counters
    pub fn with_metrics(mut self, metrics: Arc<WaitMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn criteria(&self) -> &CompletionCriteria {
        &self.criteria
    }

    /// Launch the routine and block until a completion signal or the timeout
    ///
    /// Returns `Completion::Callback(value)` or `Completion::Condition`, or
    /// `SyncError::Timeout` once the configured timeout has elapsed. Panics
    /// from the routine or the condition propagate to the caller.
    pub fn complete(self) -> SyncResult<Completion<T>> {
        let Self {
            routine,
            args,
            criteria,
            metrics,
            ..
        } = self;

        let mut span = WaitSpan::new(
            criteria.timeout(),
            criteria.waits_for_callback(),
            criteria.has_condition(),
            criteria.strategy().name(),
        );

        let (result, elapsed) = span.in_scope(|| {
            let state = InvocationState::start();
            if let Some(metrics) = &metrics {
                metrics.inc_waits_started();
            }

            debug!(wait_id = span.wait_id(), "launching routine");
            routine.invoke(args, state.completer(metrics.clone()));

            let result = monitor(&criteria, &state, metrics.as_deref());
            (result, state.elapsed())
        });

        let outcome = match &result {
            Ok(Completion::Callback(_)) => WaitOutcome::Callback,
            Ok(Completion::Condition) => WaitOutcome::Condition,
            Err(_) => WaitOutcome::Timeout,
        };
        span.record_outcome(outcome);

        if let Some(metrics) = &metrics {
            metrics.add_wait_time(elapsed);
            match outcome {
                WaitOutcome::Callback => metrics.inc_callback_completions(),
                WaitOutcome::Condition => metrics.inc_condition_completions(),
                WaitOutcome::Timeout => metrics.inc_timeouts(),
            }
        }

        result
    }
}

impl<C, F, A, T> Synchronizer<Bound<C, F>, A, T>
where
    F: FnOnce(C, A, Completer<T>),
{
    /// Wrap `routine`, to be invoked as `routine(context, args, completer)`
    pub fn with_context(context: C, routine: F, args: A, criteria: CompletionCriteria) -> Self {
        Self::new(bind(context, routine), args, criteria)
    }
}

/// Block until one of the criteria is met
fn monitor<T>(
    criteria: &CompletionCriteria,
    state: &InvocationState<T>,
    metrics: Option<&WaitMetrics>,
) -> SyncResult<Completion<T>> {
    let timeout = criteria.timeout();
    let pure_delay = criteria.is_pure_delay();
    if pure_delay {
        debug!("no completion signal configured, waiting out the timeout");
    }

    // A filled cell must not cut pauses short when nobody reads it
    let strategy = if criteria.waits_for_callback() {
        criteria.strategy()
    } else {
        WaitStrategy::Sleep
    };

    loop {
        // Timeout trumps every other signal
        let elapsed = state.elapsed();
        if elapsed > timeout {
            return Err(timed_out(elapsed, timeout));
        }

        if criteria.waits_for_callback() {
            if let Some(value) = state.take_result() {
                return Ok(Completion::Callback(value));
            }
        }

        if criteria.check_condition() == Some(true) {
            return Ok(Completion::Condition);
        }

        let remaining = timeout - elapsed;
        let pause = if pure_delay {
            remaining
        } else {
            remaining.min(criteria.poll_interval())
        };
        strategy.pause(state.cell(), pause);

        if let Some(metrics) = metrics {
            metrics.inc_pauses();
        }
    }
}

#[cold]
#[inline(never)]
fn timed_out(elapsed: Duration, timeout: Duration) -> SyncError {
    SyncError::timeout(elapsed, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Instant;

    fn criteria_ms(timeout_ms: u64) -> crate::CriteriaBuilder {
        CompletionCriteria::builder().timeout(Duration::from_millis(timeout_ms))
    }

    #[test]
    fn test_immediate_condition() {
        let criteria = CompletionCriteria::on_condition(Duration::from_secs(1), || true).unwrap();
        let start = Instant::now();
        let result = Synchronizer::new(|_: (), _done: Completer<()>| {}, (), criteria).complete();

        assert_eq!(result, Ok(Completion::Condition));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_synchronous_callback() {
        // Routine that completes before invoke returns
        let criteria = CompletionCriteria::on_callback(Duration::from_secs(1)).unwrap();
        let result = Synchronizer::new(
            |s: &str, done: Completer<String>| done.complete(s.to_uppercase()),
            "ok",
            criteria,
        )
        .complete();

        assert_eq!(result, Ok(Completion::Callback("OK".to_string())));
    }

    #[test]
    fn test_threaded_callback() {
        let criteria = CompletionCriteria::on_callback(Duration::from_secs(2)).unwrap();
        let start = Instant::now();
        let result = Synchronizer::new(
            |v: i32, done: Completer<i32>| {
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(100));
                    done.complete(v);
                });
            },
            42,
            criteria,
        )
        .complete();

        assert_eq!(result, Ok(Completion::Callback(42)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_callback_ignored_when_not_waited_for() {
        let criteria = criteria_ms(100).build().unwrap();
        let result = Synchronizer::new(
            |_: (), done: Completer<u8>| done.complete(1),
            (),
            criteria,
        )
        .complete();

        assert!(result.unwrap_err().is_timeout());
    }

    #[test]
    fn test_condition_flipped_by_other_thread() {
        let flag = Arc::new(AtomicBool::new(false));
        let flag_check = flag.clone();
        let criteria = criteria_ms(2000)
            .condition(move || flag_check.load(Ordering::Acquire))
            .build()
            .unwrap();

        let result = Synchronizer::new(
            move |_: (), _done: Completer<()>| {
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(50));
                    flag.store(true, Ordering::Release);
                });
            },
            (),
            criteria,
        )
        .complete();

        assert_eq!(result, Ok(Completion::Condition));
    }

    #[test]
    fn test_timeout_wins_over_ready_signals_when_expired() {
        // Timeout is checked before the callback on every iteration
        let criteria = criteria_ms(50).wait_for_callback(true).build().unwrap();
        let result = Synchronizer::new(
            |_: (), done: Completer<u8>| {
                thread::sleep(Duration::from_millis(80));
                done.complete(9);
            },
            (),
            criteria,
        )
        .complete();

        assert!(result.unwrap_err().is_timeout());
    }

    #[test]
    fn test_callback_checked_before_condition() {
        let criteria = criteria_ms(1000)
            .wait_for_callback(true)
            .condition(|| true)
            .build()
            .unwrap();
        let result =
            Synchronizer::new(|_: (), done: Completer<u8>| done.complete(3), (), criteria).complete();

        assert_eq!(result, Ok(Completion::Callback(3)));
    }

    #[test]
    fn test_pure_delay_times_out() {
        let criteria = CompletionCriteria::delay(Duration::from_millis(60)).unwrap();
        let start = Instant::now();
        let err = Synchronizer::new(|_: (), _done: Completer<()>| {}, (), criteria)
            .complete()
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(start.elapsed() >= Duration::from_millis(60));
        assert_eq!(err.configured_timeout(), Duration::from_millis(60));
    }

    #[test]
    fn test_with_context() {
        struct Counter {
            base: u32,
        }

        let criteria = CompletionCriteria::on_callback(Duration::from_secs(1)).unwrap();
        let result = Synchronizer::with_context(
            Counter { base: 10 },
            |ctx: Counter, n: u32, done: Completer<u32>| done.complete(ctx.base + n),
            5,
            criteria,
        )
        .complete();

        assert_eq!(result, Ok(Completion::Callback(15)));
    }

    #[test]
    fn test_metrics_recorded() {
        let metrics = Arc::new(WaitMetrics::new());

        let criteria = CompletionCriteria::on_callback(Duration::from_secs(1)).unwrap();
        Synchronizer::new(|_: (), done: Completer<()>| done.complete(()), (), criteria)
            .with_metrics(metrics.clone())
            .complete()
            .unwrap();

        let criteria = CompletionCriteria::delay(Duration::from_millis(20)).unwrap();
        let _ = Synchronizer::new(|_: (), _done: Completer<()>| {}, (), criteria)
            .with_metrics(metrics.clone())
            .complete();

        let snap = metrics.snapshot();
        assert_eq!(snap.waits_started, 2);
        assert_eq!(snap.callback_completions, 1);
        assert_eq!(snap.timeouts, 1);
        assert_eq!(snap.callbacks_fired, 1);
        assert!(snap.total_wait_us >= 20_000);
    }

    #[test]
    fn test_completion_accessors() {
        assert_eq!(Completion::Callback(1).into_value(), Some(1));
        assert_eq!(Completion::<i32>::Condition.into_value(), None);
        assert!(Completion::Callback(()).is_callback());
        assert!(Completion::<()>::Condition.is_condition());
    }
}
