//! # Jitter policy for retry delays.
//!
//! [`JitterPolicy`] adds randomness to backoff delays to prevent thundering herd effects
//! when many independent callers retry against the same dependency.
//!
//! - [`JitterPolicy::None`] no randomization, predictable delays
//! - [`JitterPolicy::Fraction`] the scaled delay is multiplied by a factor drawn
//!   uniformly from `[1 - f, 1 + f]`
//!
//! Draws come from a caller-owned [`Rng`], never from a global generator, so a
//! seeded executor produces the same schedule on every run.

use rand::Rng;

/// Policy controlling randomization of retry delays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    ///
    /// Use when:
    /// - Only one caller retrying (no herd risk)
    /// - Predictable timing required
    /// - Testing/debugging
    None,

    /// Multiplicative jitter: `delay × uniform[1 - f, 1 + f]`.
    ///
    /// `f` must be within `[0.0, 1.0]`; `0.0` behaves like [`JitterPolicy::None`].
    Fraction(f64),
}

impl Default for JitterPolicy {
    /// Returns `Fraction(0.2)`, matching [`RetryPolicy::default`](crate::RetryPolicy::default).
    fn default() -> Self {
        JitterPolicy::Fraction(0.2)
    }
}

impl JitterPolicy {
    /// Returns the configured fraction (`0.0` for [`JitterPolicy::None`]).
    pub fn fraction(&self) -> f64 {
        match self {
            JitterPolicy::None => 0.0,
            JitterPolicy::Fraction(f) => *f,
        }
    }

    /// Draws the multiplier applied to the next delay.
    ///
    /// Returns exactly `1.0` without touching the rng when jitter is disabled,
    /// so disabling jitter never shifts a seeded sequence.
    pub fn multiplier<R: Rng>(&self, rng: &mut R) -> f64 {
        let f = self.fraction();
        if f.is_nan() || f <= 0.0 {
            return 1.0;
        }
        let f = f.min(1.0);
        rng.random_range((1.0 - f)..=(1.0 + f))
    }
}
