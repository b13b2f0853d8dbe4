/*!
 * Wait Strategy
 *
 * How the poll loop pauses between completion checks.
 */

use super::cell::CompletionCell;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Pause strategy between completion checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitStrategy {
    /// Park on the completion cell's condvar (callback wakes the loop early)
    #[default]
    Condvar,
    /// Plain sleep for the full interval (callback seen on the next tick)
    Sleep,
}

impl WaitStrategy {
    /// Pause for at most `interval`
    ///
    /// Returns early only under `Condvar`, when `cell` is filled.
    #[inline]
    pub fn pause<T>(self, cell: &CompletionCell<T>, interval: Duration) {
        match self {
            Self::Condvar => {
                cell.wait_for(interval);
            }
            Self::Sleep => std::thread::sleep(interval),
        }
    }

    /// Strategy name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Condvar => "condvar",
            Self::Sleep => "sleep",
        }
    }
}

impl FromStr for WaitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "condvar" => Ok(Self::Condvar),
            "sleep" => Ok(Self::Sleep),
            other => Err(format!("unknown wait strategy: {other}")),
        }
    }
}
