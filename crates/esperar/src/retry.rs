//! Bounded blocking poll primitive.
//!
//! All waiting in the engine funnels through [`poll`]: a single-threaded
//! loop that re-evaluates a predicate at a fixed interval until it yields
//! a value or the deadline passes. There is no backoff and no cancellation
//! path; a predicate error aborts the wait immediately and is never
//! retried. Wait ceilings are seconds, so the constant-interval loop stays
//! cheap enough.

use std::thread;
use std::time::{Duration, Instant};

use crate::result::{EsperarError, EsperarResult};

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default timeout for waiting on component visibility (30 seconds)
pub const COMPONENT_VISIBLE_TIMEOUT_MS: u64 = 30_000;

/// Default timeout for waiting on component invisibility (5 seconds)
pub const COMPONENT_NOT_VISIBLE_TIMEOUT_MS: u64 = 5_000;

/// Default timeout for generic element waits (20 seconds)
pub const ELEMENT_TIMEOUT_MS: u64 = 20_000;

/// Options for one poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Deadline in milliseconds
    pub timeout_ms: u64,
    /// Fixed delay between predicate evaluations, in milliseconds
    pub interval_ms: u64,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout_ms: COMPONENT_VISIBLE_TIMEOUT_MS,
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl PollOptions {
    /// Create options with default timeout and interval
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval in milliseconds
    #[must_use]
    pub const fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Deadline as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Interval as a `Duration`
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Repeatedly evaluate `predicate` until it yields a value or the deadline
/// passes.
///
/// The predicate returns `Ok(Some(value))` when satisfied, `Ok(None)` to
/// keep polling, or `Err` to abort the wait. A satisfied predicate returns
/// its value immediately, with no trailing delay. `operation` names the
/// call site in the timeout error so failures are diagnosable without a
/// debugger.
///
/// # Errors
///
/// Returns [`EsperarError::Timeout`] when the deadline elapses without the
/// predicate yielding a value; predicate errors propagate unretried.
pub fn poll<T, F>(operation: &str, options: &PollOptions, mut predicate: F) -> EsperarResult<T>
where
    F: FnMut() -> EsperarResult<Option<T>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let interval = options.interval();

    while start.elapsed() < timeout {
        if let Some(value) = predicate()? {
            tracing::trace!(
                operation,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "poll satisfied"
            );
            return Ok(value);
        }
        thread::sleep(interval);
    }

    tracing::debug!(operation, timeout_ms = options.timeout_ms, "poll timed out");
    Err(EsperarError::Timeout {
        operation: operation.to_string(),
        ms: options.timeout_ms,
    })
}
