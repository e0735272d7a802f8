//! # Resilience Module
//!
//! Throttle-safe resubmission of provider calls. The account-vending and organization
//! providers rate-limit aggressively, and every component of the engine routes its
//! provider traffic through a shared [`ThrottleRetry`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use account_lifecycle::providers::ProviderError;
//! use account_lifecycle::resilience::{RetryPolicy, ThrottleRetry};
//!
//! # async fn example() -> Result<(), ProviderError> {
//! let retry = ThrottleRetry::new(RetryPolicy::default());
//!
//! let root_id = retry
//!     .call("list_roots", || async { Ok::<_, ProviderError>("r-abc1".to_string()) })
//!     .await?;
//! # let _ = root_id;
//! # Ok(())
//! # }
//! ```

pub mod throttle_retry;

pub use throttle_retry::{
    RecordingSleeper, RetryPolicy, Retryable, Sleeper, ThrottleRetry, TokioSleeper,
};
