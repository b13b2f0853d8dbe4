/*!
 * Synchronization Primitives
 *
 * Handoff and pause primitives behind the blocking completion wait:
 * - `CompletionCell`: write-once slot with condvar wakeup
 * - `WaitStrategy`: condvar park or plain sleep between checks
 *
 * # Use Cases
 *
 * - **Callback handoff**: routine thread fills, waiting thread takes
 * - **Poll pacing**: bounded pause between condition checks
 */

mod cell;
mod strategy;

pub use cell::CompletionCell;
pub use strategy::WaitStrategy;
