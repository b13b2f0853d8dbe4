/*!
 * Async Routines
 *
 * The contract for operations a `Synchronizer` can wrap: take the caller's
 * arguments plus a trailing `Completer`, start the work, and return. The
 * routine completes the `Completer` whenever (and on whichever thread) the
 * work finishes.
 *
 * Adapters:
 * - `bind`: pass an execution context as the routine's first argument
 * - `on_thread`: run a blocking closure on a fresh OS thread
 * - `on_runtime`: spawn a future on a tokio runtime
 */

use super::completer::Completer;
use std::future::Future;
use std::thread;
use tokio::runtime::Handle;
use tracing::error;

/// Callback-style asynchronous operation
///
/// Implemented for every `FnOnce(A, Completer<T>)`. `invoke` should return
/// promptly; the wait does not begin until it does.
pub trait AsyncRoutine<A, T> {
    fn invoke(self, args: A, completer: Completer<T>);
}

impl<A, T, F> AsyncRoutine<A, T> for F
where
    F: FnOnce(A, Completer<T>),
{
    #[inline]
    fn invoke(self, args: A, completer: Completer<T>) {
        self(args, completer)
    }
}

/// Routine bound to an execution context
pub struct Bound<C, F> {
    context: C,
    routine: F,
}

impl<C, A, T, F> AsyncRoutine<A, T> for Bound<C, F>
where
    F: FnOnce(C, A, Completer<T>),
{
    #[inline]
    fn invoke(self, args: A, completer: Completer<T>) {
        (self.routine)(self.context, args, completer)
    }
}

/// Bind `context` as the receiver of `routine`
pub fn bind<C, F>(context: C, routine: F) -> Bound<C, F> {
    Bound { context, routine }
}

/// Run `work` on a dedicated thread and complete with its return value
///
/// If the thread cannot be spawned the error is logged and the wait runs
/// into its timeout.
pub fn on_thread<A, T, F>(work: F) -> impl AsyncRoutine<A, T>
where
    F: FnOnce(A) -> T + Send + 'static,
    A: Send + 'static,
    T: Send + 'static,
{
    move |args: A, completer: Completer<T>| {
        let spawned = thread::Builder::new()
            .name("sync-adapter-routine".into())
            .spawn(move || completer.complete(work(args)));

        if let Err(e) = spawned {
            error!(error = %e, "failed to spawn routine thread");
        }
    }
}

/// Spawn the future built by `make` on `handle` and complete with its output
///
/// The task is detached: it keeps running if the wait times out.
/// Call `complete()` from a thread outside the runtime's worker pool, or the
/// blocked caller may starve the task it is waiting on.
pub fn on_runtime<A, T, F, Fut>(handle: Handle, make: F) -> impl AsyncRoutine<A, T>
where
    F: FnOnce(A) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    move |args: A, completer: Completer<T>| {
        let future = make(args);
        handle.spawn(async move {
            completer.complete(future.await);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::CompletionCell;
    use std::sync::Arc;
    use std::time::Duration;

    fn completer<T>() -> (Arc<CompletionCell<T>>, Completer<T>) {
        let cell = Arc::new(CompletionCell::new());
        let completer = Completer::new(cell.clone(), None);
        (cell, completer)
    }

    #[test]
    fn test_closure_routine() {
        let (cell, done) = completer();
        let routine = |(a, b): (i32, i32), done: Completer<i32>| done.complete(a + b);
        routine.invoke((2, 3), done);
        assert_eq!(cell.take(), Some(5));
    }

    #[test]
    fn test_bound_routine_receives_context_first() {
        let (cell, done) = completer();
        let routine = bind(String::from("ctx"), |ctx: String, arg: &str, done: Completer<String>| {
            done.complete(format!("{ctx}:{arg}"))
        });
        routine.invoke("arg", done);
        assert_eq!(cell.take().as_deref(), Some("ctx:arg"));
    }

    #[test]
    fn test_on_thread() {
        let (cell, done) = completer();
        on_thread(|n: u64| n * 2).invoke(21, done);
        assert!(cell.wait_for(Duration::from_secs(2)));
        assert_eq!(cell.take(), Some(42));
    }

    #[test]
    fn test_on_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap();

        let (cell, done) = completer();
        on_runtime(runtime.handle().clone(), |s: &'static str| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            s.len()
        })
        .invoke("four", done);

        assert!(cell.wait_for(Duration::from_secs(2)));
        assert_eq!(cell.take(), Some(4));
    }
}
