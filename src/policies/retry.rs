//! # Retry policy.
//!
//! [`RetryPolicy`] controls how many times an operation is retried and how the
//! wait between attempts grows. It is parameterized by:
//! - [`RetryPolicy::max_attempts`] retries allowed after the first attempt;
//! - [`RetryPolicy::base_delay`] the wait before the first retry;
//! - [`RetryPolicy::max_delay`] the cap on any single wait;
//! - [`RetryPolicy::factor`] the multiplicative growth factor;
//! - [`RetryPolicy::jitter`] the randomization applied to each wait.
//!
//! Waits compound: each one is derived from the previous (already jittered)
//! wait, `prev × factor × jitter`, and the cap is applied last.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{JitterPolicy, RetryPolicy};
//!
//! let policy = RetryPolicy {
//!     max_attempts: 3,
//!     base_delay: Duration::from_millis(100),
//!     max_delay: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! // First wait — base delay
//! let first = policy.next_delay(None, 1.0);
//! assert_eq!(first, Duration::from_millis(100));
//!
//! // Second wait — previous × factor
//! let second = policy.next_delay(Some(first), 1.0);
//! assert_eq!(second, Duration::from_millis(200));
//!
//! // Capped at max_delay
//! assert_eq!(policy.next_delay(Some(Duration::from_millis(800)), 1.0), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::error::PolicyError;
use crate::policies::jitter::JitterPolicy;

/// Retry policy.
///
/// Immutable, `Copy` configuration shared by value; it carries no per-call state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total invocations = `max_attempts + 1`).
    pub max_attempts: u32,
    /// Wait before the first retry (must be `> 0`).
    pub base_delay: Duration,
    /// Upper bound for any wait (must be `>= base_delay`).
    pub max_delay: Duration,
    /// Multiplicative growth factor (must be `> 1.0`).
    pub factor: f64,
    /// Randomization applied to every wait.
    pub jitter: JitterPolicy,
}

impl Default for RetryPolicy {
    /// Returns a policy with:
    /// - `max_attempts = 3`;
    /// - `base_delay = 100ms`;
    /// - `max_delay = 10s`;
    /// - `factor = 1.5`;
    /// - `jitter = Fraction(0.2)`.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            factor: 1.5,
            jitter: JitterPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// Total number of invocations this policy allows.
    pub fn total_attempts(&self) -> u64 {
        u64::from(self.max_attempts) + 1
    }

    /// Checks the policy invariants.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use retryvisor::{PolicyError, RetryPolicy};
    ///
    /// let mut policy = RetryPolicy::default();
    /// assert!(policy.validate().is_ok());
    ///
    /// policy.max_delay = Duration::from_millis(10);
    /// assert!(matches!(policy.validate(), Err(PolicyError::MaxBelowBase { .. })));
    /// ```
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.base_delay.is_zero() {
            return Err(PolicyError::ZeroBaseDelay);
        }
        if self.max_delay < self.base_delay {
            return Err(PolicyError::MaxBelowBase {
                base: self.base_delay,
                max: self.max_delay,
            });
        }
        if !self.factor.is_finite() || self.factor <= 1.0 {
            return Err(PolicyError::FactorTooSmall {
                factor: self.factor,
            });
        }
        let fraction = self.jitter.fraction();
        if !(0.0..=1.0).contains(&fraction) {
            return Err(PolicyError::JitterOutOfRange { fraction });
        }
        Ok(())
    }

    /// Computes the next wait from the previous one and a jitter multiplier.
    ///
    /// - `prev = None` (first retry): `base_delay × multiplier`; the first wait skips `factor`;
    /// - `prev = Some(d)`: `d × factor × multiplier`.
    ///
    /// The result is clamped to [`RetryPolicy::max_delay`] after jitter.
    /// Non-finite or negative products also clamp to `max_delay`.
    pub fn next_delay(&self, prev: Option<Duration>, multiplier: f64) -> Duration {
        let secs = match prev {
            None => self.base_delay.as_secs_f64() * multiplier,
            Some(d) => d.as_secs_f64() * self.factor * multiplier,
        };

        if !secs.is_finite() || secs < 0.0 || secs > self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::try_from_secs_f64(secs)
                .map_or(self.max_delay, |d| d.min(self.max_delay))
        }
    }
}
