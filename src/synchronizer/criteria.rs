/*!
 * Completion Criteria
 *
 * Immutable configuration for one blocking wait:
 * - Timeout: wall-clock bound, always checked first
 * - Callback: whether the routine's Completer must fire
 * - Condition: caller predicate polled between pauses
 *
 * # Example
 *
 * ```
 * use sync_adapter::CompletionCriteria;
 * use std::time::Duration;
 *
 * let criteria = CompletionCriteria::builder()
 *     .timeout(Duration::from_secs(2))
 *     .wait_for_callback(true)
 *     .build()
 *     .unwrap();
 * assert!(criteria.waits_for_callback());
 * ```
 */

use crate::core::errors::{CriteriaError, CriteriaResult};
use crate::core::limits::{
    DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, ENV_POLL_INTERVAL_MS, ENV_STRATEGY, ENV_TIMEOUT_SECS,
    ENV_WAIT_FOR_CALLBACK, MAX_TIMEOUT_SECS,
};
use crate::core::sync::WaitStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Zero-argument completion predicate
///
/// Called repeatedly from the waiting thread; must be cheap and side-effect free.
pub type Condition = Arc<dyn Fn() -> bool + Send + Sync>;

/// What `complete()` waits for, and for how long
#[derive(Clone)]
pub struct CompletionCriteria {
    timeout: Duration,
    condition: Option<Condition>,
    wait_for_callback: bool,
    poll_interval: Duration,
    strategy: WaitStrategy,
}

impl CompletionCriteria {
    /// Start from defaults (10s timeout, no signals, 20ms poll, condvar)
    pub fn builder() -> CriteriaBuilder {
        CriteriaBuilder::default()
    }

    /// Wait for the routine's Completer, up to `timeout`
    pub fn on_callback(timeout: Duration) -> CriteriaResult<Self> {
        Self::builder().timeout(timeout).wait_for_callback(true).build()
    }

    /// Wait for `condition` to hold, up to `timeout`
    pub fn on_condition<F>(timeout: Duration, condition: F) -> CriteriaResult<Self>
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self::builder().timeout(timeout).condition(condition).build()
    }

    /// Pure delay: no completion signal, `complete()` always times out
    pub fn delay(timeout: Duration) -> CriteriaResult<Self> {
        Self::builder().timeout(timeout).build()
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[inline]
    pub fn waits_for_callback(&self) -> bool {
        self.wait_for_callback
    }

    #[inline]
    pub fn has_condition(&self) -> bool {
        self.condition.is_some()
    }

    /// Evaluate the condition, `None` if no condition is configured
    #[inline]
    pub fn check_condition(&self) -> Option<bool> {
        self.condition.as_ref().map(|condition| condition())
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    #[inline]
    pub fn strategy(&self) -> WaitStrategy {
        self.strategy
    }

    /// Neither callback nor condition configured
    #[inline]
    pub fn is_pure_delay(&self) -> bool {
        !self.wait_for_callback && self.condition.is_none()
    }
}

impl Default for CompletionCriteria {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            condition: None,
            wait_for_callback: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            strategy: WaitStrategy::default(),
        }
    }
}

impl fmt::Debug for CompletionCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionCriteria")
            .field("timeout", &self.timeout)
            .field("condition", &self.condition.as_ref().map(|_| "<predicate>"))
            .field("wait_for_callback", &self.wait_for_callback)
            .field("poll_interval", &self.poll_interval)
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Partial criteria; unset fields take defaults on `build`
#[derive(Default)]
pub struct CriteriaBuilder {
    timeout: Option<Duration>,
    condition: Option<Condition>,
    wait_for_callback: bool,
    poll_interval: Option<Duration>,
    strategy: Option<WaitStrategy>,
    error: Option<CriteriaError>,
}

impl CriteriaBuilder {
    /// Seed a builder from a deserialized config
    pub fn from_config(config: &CriteriaConfig) -> Self {
        let mut builder = Self::default();
        if let Some(secs) = config.timeout {
            builder = builder.timeout_secs(secs);
        }
        if let Some(callback) = config.callback {
            builder = builder.wait_for_callback(callback);
        }
        if let Some(ms) = config.poll_interval_ms {
            builder = builder.poll_interval(Duration::from_millis(ms));
        }
        if let Some(strategy) = config.strategy {
            builder = builder.strategy(strategy);
        }
        builder
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Timeout as fractional seconds; non-finite or non-positive values fail `build`
    pub fn timeout_secs(mut self, secs: f64) -> Self {
        match duration_from_secs(secs) {
            Ok(timeout) => self.timeout = Some(timeout),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    pub fn wait_for_callback(mut self, wait: bool) -> Self {
        self.wait_for_callback = wait;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn strategy(mut self, strategy: WaitStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Validate and freeze
    pub fn build(self) -> CriteriaResult<CompletionCriteria> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(CriteriaError::InvalidTimeout("timeout must be positive".into()));
        }

        let poll_interval = self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL);
        if poll_interval.is_zero() {
            return Err(CriteriaError::InvalidPollInterval(
                "poll interval must be positive".into(),
            ));
        }

        if self.wait_for_callback && self.condition.is_some() {
            warn!("both callback and condition configured; the callback is checked first");
        }

        Ok(CompletionCriteria {
            timeout,
            condition: self.condition,
            wait_for_callback: self.wait_for_callback,
            poll_interval,
            strategy: self.strategy.unwrap_or_default(),
        })
    }
}

fn duration_from_secs(secs: f64) -> CriteriaResult<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(CriteriaError::InvalidTimeout(format!(
            "{secs} is not a positive number of seconds"
        )));
    }
    if secs > MAX_TIMEOUT_SECS {
        return Err(CriteriaError::InvalidTimeout(format!(
            "{secs}s exceeds the maximum of {MAX_TIMEOUT_SECS}s"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Serializable criteria options (everything except the condition)
///
/// ```json
/// { "timeout": 2.5, "callback": true, "poll_interval_ms": 10, "strategy": "sleep" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CriteriaConfig {
    /// Seconds before failure
    pub timeout: Option<f64>,
    /// Wait for the routine's completion callback
    pub callback: Option<bool>,
    pub poll_interval_ms: Option<u64>,
    pub strategy: Option<WaitStrategy>,
}

impl CriteriaConfig {
    pub fn from_json(json: &str) -> CriteriaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read overrides from `SYNC_ADAPTER_*` environment variables
    ///
    /// Unset variables leave the field empty; malformed ones are errors.
    pub fn from_env() -> CriteriaResult<Self> {
        Ok(Self {
            timeout: env_var(ENV_TIMEOUT_SECS, |v| v.parse::<f64>().ok())?,
            callback: env_var(ENV_WAIT_FOR_CALLBACK, parse_bool)?,
            poll_interval_ms: env_var(ENV_POLL_INTERVAL_MS, |v| v.parse::<u64>().ok())?,
            strategy: env_var(ENV_STRATEGY, |v| v.parse::<WaitStrategy>().ok())?,
        })
    }

    /// Validate into criteria without a condition
    pub fn to_criteria(&self) -> CriteriaResult<CompletionCriteria> {
        CriteriaBuilder::from_config(self).build()
    }
}

fn env_var<T>(var: &str, parse: impl Fn(&str) -> Option<T>) -> CriteriaResult<Option<T>> {
    match std::env::var(var) {
        Ok(value) => parse(value.trim())
            .map(Some)
            .ok_or_else(|| CriteriaError::InvalidEnv {
                var: var.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
