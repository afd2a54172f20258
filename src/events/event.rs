//! # Lifecycle events emitted by the retry executor.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Attempt events**: per-invocation flow (starting, failed, backoff scheduled)
//! - **Terminal events**: how a call ended (succeeded, exhausted, aborted, cancelled, ...)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! retrier name, error messages and backoff delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Events from one call are delivered in order; `seq` restores ordering across calls.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_retrier("fetch")
//!     .with_error("connection refused")
//!     .with_attempt(0)
//!     .with_delay(Duration::from_millis(100));
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.retrier.as_deref(), Some("fetch"));
//! assert_eq!(ev.delay, Some(Duration::from_millis(100)));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of executor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Attempt events ===
    /// An attempt is about to invoke the operation.
    ///
    /// Sets:
    /// - `attempt`: attempt index (0-based)
    /// - `delay`: wait that preceded this attempt (absent for attempt 0)
    AttemptStarting,

    /// The operation returned an error for this attempt.
    ///
    /// Sets:
    /// - `attempt`: attempt index
    /// - `error`: failure message
    AttemptFailed,

    /// Next attempt scheduled after a retryable failure.
    ///
    /// Sets:
    /// - `attempt`: index of the failed attempt
    /// - `delay`: wait before the next attempt
    /// - `error`: last failure message
    BackoffScheduled,

    // === Terminal events ===
    /// The operation succeeded.
    ///
    /// Sets:
    /// - `attempt`: index of the successful attempt
    Succeeded,

    /// Every allowed attempt failed.
    ///
    /// Sets:
    /// - `attempt`: index of the final attempt
    /// - `error`: final failure message
    Exhausted,

    /// The retryable predicate rejected a failure.
    ///
    /// Sets:
    /// - `attempt`: index of the rejected attempt
    /// - `error`: failure message
    Aborted,

    /// The cancellation token fired during a wait.
    ///
    /// Sets:
    /// - `attempt`: index of the last completed attempt
    Cancelled,

    /// The deadline passed during a wait.
    ///
    /// Sets:
    /// - `attempt`: index of the last completed attempt
    DeadlineExceeded,

    /// The operation panicked (panic capture enabled).
    ///
    /// Sets:
    /// - `attempt`: attempt index
    /// - `error`: panic info/message
    Panicked,
}

impl EventKind {
    /// `true` for kinds that end a call.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            EventKind::AttemptStarting | EventKind::AttemptFailed | EventKind::BackoffScheduled
        )
    }
}

/// Executor event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the retrier, if one was configured.
    pub retrier: Option<Arc<str>>,
    /// Attempt index (0-based).
    pub attempt: Option<u32>,
    /// Backoff delay (before the next attempt, or before this one for `AttemptStarting`).
    pub delay: Option<Duration>,
    /// Human-readable error message.
    pub error: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            retrier: None,
            attempt: None,
            delay: None,
            error: None,
        }
    }

    /// Attaches a retrier name.
    #[inline]
    pub fn with_retrier(mut self, name: impl Into<Arc<str>>) -> Self {
        self.retrier = Some(name.into());
        self
    }

    /// Attaches an attempt index.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay.
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    /// Attaches an error message.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }
}
