//! # Retry backoff for group delivery.
//!
//! [`RetryBackoff`] controls how many extra attempts a failing group listener
//! gets and how long the bus waits between them. It is parameterized by:
//! - [`RetryBackoff::max_retries`] the number of retries after the initial
//!   attempt;
//! - [`RetryBackoff::first_backoff`] the delay before the first retry;
//! - [`RetryBackoff::jitter_factor`] the randomization applied to each delay.
//!
//! The delay before retry `k` (1-based) is `first_backoff × 2^(k-1)`,
//! multiplied by a uniform random factor in
//! `[1 − jitter_factor, 1 + jitter_factor]`. The base delay derives purely
//! from the attempt number, so jitter output never feeds back into later
//! delays.
//!
//! Only group-listener invocations are retried. When the listener still fails
//! after the final retry, the event goes to
//! [`EventDeadLetters`](crate::EventDeadLetters) and the failure is swallowed.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use mailbus::RetryBackoff;
//!
//! let backoff = RetryBackoff::new(3, Duration::from_millis(100), 0.0).unwrap();
//!
//! // Retry 1 — waits 'first_backoff' (100ms)
//! assert_eq!(backoff.delay(1), Duration::from_millis(100));
//!
//! // Retry 3 — 100ms × 2^2 = 400ms
//! assert_eq!(backoff.delay(3), Duration::from_millis(400));
//! ```

use std::time::Duration;

use rand::Rng;

use crate::error::RetryBackoffError;

/// Retry backoff configuration for group delivery.
#[derive(Clone, Copy, Debug)]
pub struct RetryBackoff {
    max_retries: u32,
    first_backoff: Duration,
    jitter_factor: f64,
}

impl RetryBackoff {
    /// Default number of retries after the initial attempt.
    pub const DEFAULT_MAX_RETRIES: u32 = 8;
    /// Default delay before the first retry.
    pub const DEFAULT_FIRST_BACKOFF: Duration = Duration::from_millis(100);
    /// Default jitter factor.
    pub const DEFAULT_JITTER_FACTOR: f64 = 0.5;

    /// Delays stop growing once the base reaches this many seconds, keeping
    /// the float math finite for absurd attempt numbers.
    const CEILING_SECS: f64 = 1e9;

    /// Creates a validated configuration.
    ///
    /// `jitter_factor` must lie in `[0, 1)`; `0` disables jitter.
    pub fn new(
        max_retries: u32,
        first_backoff: Duration,
        jitter_factor: f64,
    ) -> Result<Self, RetryBackoffError> {
        if !jitter_factor.is_finite() || !(0.0..1.0).contains(&jitter_factor) {
            return Err(RetryBackoffError::InvalidJitterFactor {
                value: jitter_factor,
            });
        }
        Ok(Self {
            max_retries,
            first_backoff,
            jitter_factor,
        })
    }

    /// Number of retries granted after the initial attempt.
    #[inline]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before the first retry.
    #[inline]
    pub fn first_backoff(&self) -> Duration {
        self.first_backoff
    }

    /// Fraction by which delays are randomized.
    #[inline]
    pub fn jitter_factor(&self) -> f64 {
        self.jitter_factor
    }

    /// Computes the delay before the given retry (1-based).
    ///
    /// The base is `first_backoff × 2^(attempt-1)`; jitter multiplies it by a
    /// uniform factor in `[1 − jitter_factor, 1 + jitter_factor]`. An attempt
    /// of `0` is treated as `1`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base = self.first_backoff.as_secs_f64() * 2f64.powi(exp);
        let base = if base.is_finite() {
            base.min(Self::CEILING_SECS)
        } else {
            Self::CEILING_SECS
        };

        if self.jitter_factor == 0.0 {
            return Duration::from_secs_f64(base);
        }

        let mut rng = rand::rng();
        let factor = rng.random_range(1.0 - self.jitter_factor..=1.0 + self.jitter_factor);
        Duration::from_secs_f64(base * factor)
    }
}

impl Default for RetryBackoff {
    /// Returns the platform defaults: 8 retries, 100ms first backoff,
    /// jitter factor 0.5.
    fn default() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            first_backoff: Self::DEFAULT_FIRST_BACKOFF,
            jitter_factor: Self::DEFAULT_JITTER_FACTOR,
        }
    }
}
