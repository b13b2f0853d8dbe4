/*!
 * Synchronizer Module
 *
 * Blocking adapter for callback-style asynchronous routines:
 * - Criteria: timeout, callback and condition configuration
 * - Routine: the `AsyncRoutine` contract and its adapters
 * - Completer: one-shot completion capability handed to the routine
 * - Synchronizer: launch + poll-until-satisfied loop
 */

mod completer;
mod criteria;
pub mod routine;
mod state;
mod synchronizer;

pub use completer::Completer;
pub use criteria::{CompletionCriteria, Condition, CriteriaBuilder, CriteriaConfig};
pub use routine::{AsyncRoutine, Bound};
pub use synchronizer::{Completion, Synchronizer};
