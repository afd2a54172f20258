//! # retryvisor
//!
//! **Retryvisor** is a small async retry library for Rust.
//!
//! It runs a fallible operation again and again with exponential backoff and
//! jitter. It honors caller cancellation and reports precisely why it stopped.
//! Around that core sit panic recovery and an error group for concurrent jobs.
//!
//! ## Architecture
//! ```text
//!   RetryPolicy ──► RetrierBuilder ──► Retrier::retry_if(token, op, is_retryable)
//!   (validated)     (rng, subs,          │
//!                    deadline)           │
//!                                        ▼
//! loop {
//!   ├─► publish AttemptStarting{ attempt, waited }
//!   ├─► op().await  (optionally via catch_panic)
//!   │       │
//!   │       ├─ Ok  ──► publish Succeeded ──► return Ok(value)
//!   │       │
//!   │       └─ Err ──► publish AttemptFailed
//!   │                  ├─ predicate rejects   ─► Aborted,   return Err
//!   │                  ├─ attempts exhausted  ─► Exhausted, return Err
//!   │                  └─ otherwise:
//!   │                       ├─ delay = next_delay(prev, jitter(rng))
//!   │                       ├─ publish BackoffScheduled{ delay, attempt }
//!   │                       └─ wait(delay) ── token ─► Cancelled
//!   │                                      └─ deadline ─► DeadlineExceeded
//!   └─ prev = delay, attempt += 1
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                      |
//! |-------------------|---------------------------------------------------------------|-----------------------------------------|
//! | **Executor**      | Retry loop with backoff, jitter, cancellation and deadline.   | [`Retrier`], [`retry`], [`retry_if`]    |
//! | **Policies**      | Attempts, delays, growth factor, jitter; validated.           | [`RetryPolicy`], [`JitterPolicy`]       |
//! | **Errors**        | Typed outcomes that keep failure kinds apart.                 | [`RetryError`], [`PolicyError`]         |
//! | **Subscriber API**| Hook into attempt lifecycle events (logging, metrics).        | [`Subscribe`], [`Event`]                |
//! | **Recovery**      | Turn a panicking future into an error value.                  | [`catch_panic`], [`Panicked`]           |
//! | **Error groups**  | Concurrent jobs, first failure wins, siblings cancelled.      | [`ErrorGroup`], [`GroupError`]          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use retryvisor::{JitterPolicy, RetryError, Retrier, RetryPolicy};
//!
//! #[derive(Debug)]
//! enum FetchError { Unavailable, NotFound }
//!
//! impl std::fmt::Display for FetchError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         match self {
//!             FetchError::Unavailable => f.write_str("service unavailable"),
//!             FetchError::NotFound => f.write_str("not found"),
//!         }
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let policy = RetryPolicy {
//!         max_attempts: 5,
//!         base_delay: Duration::from_millis(1),
//!         max_delay: Duration::from_millis(20),
//!         factor: 2.0,
//!         jitter: JitterPolicy::Fraction(0.1),
//!     };
//!     let mut retrier = Retrier::builder(policy).seed(7).name("fetch").build()?;
//!     let token = CancellationToken::new();
//!
//!     // NotFound is terminal: exactly one invocation.
//!     let res: Result<(), _> = retrier
//!         .retry_if(&token, || async { Err(FetchError::NotFound) }, |e: &FetchError| {
//!             matches!(e, FetchError::Unavailable)
//!         })
//!         .await;
//!     assert!(matches!(res, Err(RetryError::Aborted { attempt: 0, .. })));
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod group;
mod policies;
mod recovery;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Retrier, RetrierBuilder, retry, retry_if};
pub use error::{GroupError, Panicked, PolicyError, RetryError};
pub use events::{Event, EventKind};
pub use group::ErrorGroup;
pub use policies::{JitterPolicy, RetryPolicy};
pub use recovery::catch_panic;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
