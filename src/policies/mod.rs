//! Retry policies.
//!
//! This module groups the knobs that control **how many times** an operation is
//! retried and **how long** to wait between attempts.
//!
//! ## Contents
//! - [`RetryPolicy`] attempts, base/max delay, growth factor (+ validation)
//! - [`JitterPolicy`] randomization strategy to avoid thundering herd
//!
//! ## Quick wiring
//! ```text
//! RetrierBuilder::new(RetryPolicy) ──► validate() ──► Retrier
//!      └─► core::retrier uses:
//!           - max_attempts to decide continue/exit
//!           - jitter.multiplier(rng) + next_delay(prev, m) to schedule the next attempt
//! ```
//!
//! ## Defaults
//! - `RetryPolicy::default()` → 3 retries, base=100ms, factor=1.5, max=10s, jitter=0.2.
//! - `JitterPolicy::default()` → `Fraction(0.2)`; use `None` for deterministic schedules.

mod jitter;
mod retry;

pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
