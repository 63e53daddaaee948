//! Bounded retry-with-delay.
//!
//! `poll_until` repeats a fallible fetch a fixed number of times with a fixed
//! pause in between, stopping at the first value that satisfies a predicate.
//! Fetch errors are treated as "not ready yet". There is no backoff and no
//! distinction between a slow producer and a failed one.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// How many times to try and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on the time spent sleeping (the fetches themselves excluded).
    /// Saturates at `Duration::MAX`.
    pub fn max_wait(&self) -> Duration {
        self.interval
            .checked_mul(self.max_attempts.saturating_sub(1))
            .unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    /// Ten attempts, one second apart.
    fn default() -> Self {
        Self::new(10, Duration::from_secs(1))
    }
}

/// Result of [`poll_until`].
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// A fetched value satisfied the predicate.
    Ready { value: T, attempts: u32 },
    /// The budget ran out. `last` is the most recent successful fetch, if any.
    Exhausted { last: Option<T>, attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// The ready value, or the last fetched value when exhausted.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Ready { value, .. } => Some(value),
            Self::Exhausted { last, .. } => last,
        }
    }
}

/// Fetch until `ready` accepts a value or `policy.max_attempts` is spent.
///
/// Sleeps `policy.interval` between attempts, never after the final one.
/// A zero-attempt policy returns `Exhausted` without calling `fetch`.
pub async fn poll_until<T, E, F, Fut, P>(policy: RetryPolicy, mut fetch: F, ready: P) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&T) -> bool,
    E: Display,
{
    let mut last = None;

    for attempt in 1..=policy.max_attempts {
        match fetch().await {
            Ok(value) if ready(&value) => {
                return PollOutcome::Ready {
                    value,
                    attempts: attempt,
                };
            }
            Ok(value) => {
                debug!(attempt, "Poll result not ready");
                last = Some(value);
            }
            Err(e) => {
                debug!(attempt, error = %e, "Poll fetch failed; treating as not ready");
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    PollOutcome::Exhausted {
        last,
        attempts: policy.max_attempts,
    }
}
