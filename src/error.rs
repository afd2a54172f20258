//! Error types used by the retry executor, its policies and the error group.
//!
//! This module defines:
//!
//! - [`RetryError`] — the terminal outcome of a failed [`Retrier`](crate::Retrier) call.
//! - [`PolicyError`] — a [`RetryPolicy`](crate::RetryPolicy) that violates its invariants.
//! - [`Panicked`] — a panic captured by [`catch_panic`](crate::catch_panic).
//! - [`GroupError`] — a failed or panicked job inside an [`ErrorGroup`](crate::ErrorGroup).
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Terminal failure of a retried operation.
///
/// The variants keep the three failure kinds apart so callers can tell
/// "the operation kept failing" from "I gave up waiting":
/// - [`RetryError::Exhausted`] / [`RetryError::Aborted`] carry the operation's own error, unchanged;
/// - [`RetryError::Cancelled`] / [`RetryError::DeadlineExceeded`] fired during an inter-attempt wait;
/// - [`RetryError::Panicked`] is only produced when panic capture is enabled.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// Every allowed attempt failed; `error` is the last failure.
    #[error("retries exhausted after {attempts} attempts: {error}")]
    Exhausted {
        /// Number of invocations made.
        attempts: u32,
        /// Failure returned by the final invocation.
        error: E,
    },

    /// The retryable predicate classified the failure as terminal.
    #[error("non-retryable failure on attempt {attempt}: {error}")]
    Aborted {
        /// 0-based index of the rejected attempt.
        attempt: u32,
        /// Failure that was rejected.
        error: E,
    },

    /// The cancellation token fired while waiting for the next attempt.
    #[error("retry cancelled after {attempts} attempts")]
    Cancelled {
        /// Number of invocations made before cancellation.
        attempts: u32,
    },

    /// The configured deadline passed while waiting for the next attempt.
    #[error("retry deadline exceeded after {attempts} attempts")]
    DeadlineExceeded {
        /// Number of invocations made before the deadline.
        attempts: u32,
    },

    /// The operation panicked (only with panic capture enabled).
    #[error("operation panicked on attempt {attempt}: {message}")]
    Panicked {
        /// 0-based index of the panicking attempt.
        attempt: u32,
        /// Rendered panic payload.
        message: String,
    },
}

impl<E> RetryError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use retryvisor::RetryError;
    ///
    /// let err: RetryError<std::io::Error> = RetryError::Cancelled { attempts: 1 };
    /// assert_eq!(err.as_label(), "retry_cancelled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Exhausted { .. } => "retry_exhausted",
            RetryError::Aborted { .. } => "retry_aborted",
            RetryError::Cancelled { .. } => "retry_cancelled",
            RetryError::DeadlineExceeded { .. } => "retry_deadline_exceeded",
            RetryError::Panicked { .. } => "retry_panicked",
        }
    }

    /// Number of operation invocations that happened before this outcome.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. }
            | RetryError::Cancelled { attempts }
            | RetryError::DeadlineExceeded { attempts } => *attempts,
            RetryError::Aborted { attempt, .. } | RetryError::Panicked { attempt, .. } => {
                attempt + 1
            }
        }
    }

    /// `true` when the caller's token or deadline ended the call, not the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            RetryError::Cancelled { .. } | RetryError::DeadlineExceeded { .. }
        )
    }

    /// Borrows the operation's own error, if this outcome carries one.
    pub fn error_ref(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { error, .. } | RetryError::Aborted { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Unwraps the operation's own error, unchanged.
    ///
    /// Returns `None` for cancellation, deadline and panic outcomes.
    ///
    /// # Example
    /// ```
    /// use retryvisor::RetryError;
    ///
    /// let err = RetryError::Exhausted { attempts: 4, error: "refused" };
    /// assert_eq!(err.into_error(), Some("refused"));
    /// ```
    pub fn into_error(self) -> Option<E> {
        match self {
            RetryError::Exhausted { error, .. } | RetryError::Aborted { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl<E: std::fmt::Display> RetryError<E> {
    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RetryError::Exhausted { attempts, error } => {
                format!("exhausted: attempts={attempts} error={error}")
            }
            RetryError::Aborted { attempt, error } => {
                format!("aborted: attempt={attempt} error={error}")
            }
            RetryError::Cancelled { attempts } => format!("cancelled: attempts={attempts}"),
            RetryError::DeadlineExceeded { attempts } => {
                format!("deadline exceeded: attempts={attempts}")
            }
            RetryError::Panicked { attempt, message } => {
                format!("panicked: attempt={attempt} info={message}")
            }
        }
    }
}

/// # Invalid retry policy.
///
/// Returned by [`RetryPolicy::validate`](crate::RetryPolicy::validate) and
/// [`RetrierBuilder::build`](crate::RetrierBuilder::build).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// `base_delay` must be positive.
    #[error("base delay must be greater than zero")]
    ZeroBaseDelay,

    /// `max_delay` must not be smaller than `base_delay`.
    #[error("max delay {max:?} is below base delay {base:?}")]
    MaxBelowBase {
        /// Configured base delay.
        base: Duration,
        /// Configured max delay.
        max: Duration,
    },

    /// `factor` must be a finite number greater than `1.0`.
    #[error("backoff factor must be > 1.0, got {factor}")]
    FactorTooSmall {
        /// Configured factor.
        factor: f64,
    },

    /// Jitter fraction must be within `[0.0, 1.0]`.
    #[error("jitter fraction must be within [0.0, 1.0], got {fraction}")]
    JitterOutOfRange {
        /// Configured fraction.
        fraction: f64,
    },
}

impl PolicyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PolicyError::ZeroBaseDelay => "policy_zero_base_delay",
            PolicyError::MaxBelowBase { .. } => "policy_max_below_base",
            PolicyError::FactorTooSmall { .. } => "policy_factor_too_small",
            PolicyError::JitterOutOfRange { .. } => "policy_jitter_out_of_range",
        }
    }
}

/// # A panic caught while polling a future.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("panic recovered: {message}")]
pub struct Panicked {
    /// Rendered panic payload (`&str`/`String` payloads verbatim).
    pub message: String,
}

/// # Failure reported by an [`ErrorGroup`](crate::ErrorGroup).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GroupError<E> {
    /// A job returned an error.
    #[error("job {job:?} failed: {error}")]
    Failed {
        /// Name given to the job at spawn time.
        job: String,
        /// Error returned by the job.
        error: E,
    },

    /// A job panicked.
    #[error("job {job:?} panicked: {message}")]
    Panicked {
        /// Name given to the job at spawn time.
        job: String,
        /// Rendered panic payload.
        message: String,
    },
}

impl<E> GroupError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            GroupError::Failed { .. } => "group_job_failed",
            GroupError::Panicked { .. } => "group_job_panicked",
        }
    }

    /// Name of the job that produced this failure.
    pub fn job(&self) -> &str {
        match self {
            GroupError::Failed { job, .. } | GroupError::Panicked { job, .. } => job,
        }
    }
}
