//! # Throttle-Safe Retry
//!
//! Bounded resubmission of whole provider calls when the provider answers with a
//! rate-limit class error. This sits *outside* any retry the provider SDK performs on
//! its own, so the effective number of wire attempts is `max_attempts` multiplied by the
//! SDK's own retry count.
//!
//! ## Backoff
//!
//! ```text
//! retry 0: min(base      + jitter, cap)
//! retry 1: min(base * 2  + jitter, cap)
//! retry 2: min(base * 4  + jitter, cap)
//! ```
//!
//! The jitter is drawn once per call and reused for every retry of that call, which
//! makes the schedule monotonically non-decreasing and reproducible under a seeded
//! source.
//!
//! ## Idempotency
//!
//! Only wrap idempotent reads, or writes that carry an idempotency token generated
//! inside the wrapped closure. A write accepted by the provider whose response was lost
//! will otherwise be applied twice.

use crate::config::RetryConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Classifies errors for the retry layer
pub trait Retryable: Sized {
    /// Whether the error is rate-limit class and the call may be resubmitted
    fn is_retryable(&self) -> bool;

    /// Convert the final retryable error once attempts are exhausted
    fn exhausted(self, _operation: &str, _attempts: u32) -> Self {
        self
    }
}

/// Suspension point used between attempts
#[async_trait]
pub trait Sleeper: Send + Sync + fmt::Debug {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested sleeps without suspending (for tests and dry runs)
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sleep requested so far, in order
    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }

    /// Sum of all requested sleeps
    pub fn total(&self) -> Duration {
        self.slept.lock().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}

/// Retry bounds and backoff shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of calls, including the first one
    pub max_attempts: u32,
    /// Sleep before the first retry, before jitter
    pub base_delay: Duration,
    /// Upper bound of any single sleep
    pub max_delay: Duration,
    /// Upper bound of the per-call jitter
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Sleep before retry number `retry_index` (0-based) for a given jitter
    pub fn delay_for_retry(&self, retry_index: u32, jitter: Duration) -> Duration {
        let factor = 2u32.saturating_pow(retry_index);
        self.base_delay
            .saturating_mul(factor)
            .saturating_add(jitter)
            .min(self.max_delay)
    }

    /// Full sleep schedule of one call that is throttled on every attempt
    pub fn backoff_schedule(&self, jitter: Duration) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|retry_index| self.delay_for_retry(retry_index, jitter))
            .collect()
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
        }
    }
}

enum Failure<E> {
    Fatal(E),
    Exhausted { error: E, attempts: u32 },
}

/// Resubmits provider calls that fail with rate-limit class errors
#[derive(Debug)]
pub struct ThrottleRetry {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    rng: Mutex<StdRng>,
}

impl ThrottleRetry {
    /// Create a retry wrapper sleeping on the tokio timer with entropy-seeded jitter
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(TokioSleeper),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Build from the `retry` configuration section
    pub fn from_config(config: &RetryConfig) -> Self {
        let retry = Self::new(RetryPolicy::from(config));
        match config.jitter_seed {
            Some(seed) => retry.with_jitter_seed(seed),
            None => retry,
        }
    }

    /// Replace the suspension strategy
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Make jitter reproducible
    pub fn with_jitter_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn draw_jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.policy.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.lock().gen_range(0..=max_ms))
    }

    /// Run `operation`, resubmitting it while it fails with a retryable error
    ///
    /// Once attempts are exhausted the last error is converted with
    /// [`Retryable::exhausted`]. Non-retryable errors are returned untouched after the
    /// first failure.
    pub async fn call<T, E, F, Fut>(&self, operation: &str, op: F) -> Result<T, E>
    where
        E: Retryable + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.execute(operation, E::is_retryable, op).await {
            Ok(value) => Ok(value),
            Err(Failure::Fatal(error)) => Err(error),
            Err(Failure::Exhausted { error, attempts }) => Err(error.exhausted(operation, attempts)),
        }
    }

    /// Like [`call`](Self::call) with an explicit retryability classifier
    ///
    /// The last error is returned unchanged when attempts are exhausted.
    pub async fn call_with<T, E, F, Fut, C>(
        &self,
        operation: &str,
        is_retryable: C,
        op: F,
    ) -> Result<T, E>
    where
        E: fmt::Display,
        C: Fn(&E) -> bool,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute(operation, is_retryable, op)
            .await
            .map_err(|failure| match failure {
                Failure::Fatal(error) | Failure::Exhausted { error, .. } => error,
            })
    }

    async fn execute<T, E, F, Fut, C>(
        &self,
        operation: &str,
        is_retryable: C,
        mut op: F,
    ) -> Result<T, Failure<E>>
    where
        E: fmt::Display,
        C: Fn(&E) -> bool,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let jitter = self.draw_jitter();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation = %operation, attempt, "🟢 Provider call recovered after throttling");
                    }
                    return Ok(value);
                }
                Err(error) if !is_retryable(&error) => return Err(Failure::Fatal(error)),
                Err(error) => {
                    if attempt >= self.policy.max_attempts {
                        error!(
                            operation = %operation,
                            attempts = attempt,
                            error = %error,
                            "❌ Provider still throttling, giving up"
                        );
                        return Err(Failure::Exhausted {
                            error,
                            attempts: attempt,
                        });
                    }

                    let delay = self.policy.delay_for_retry(attempt - 1, jitter);
                    warn!(
                        operation = %operation,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "⏳ Provider throttled, resubmitting call"
                    );
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }
}
