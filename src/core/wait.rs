//! # Cancellable inter-attempt wait.
//!
//! The single suspension point of the executor besides the operation itself.
//!
//! ## Rules
//! - Cancellation and the deadline take priority over the sleep (`biased` select),
//!   so a token cancelled before the wait starts never sleeps at all.
//! - A deadline that has already passed returns immediately.

use std::time::Duration;

use tokio::{select, time, time::Instant};
use tokio_util::sync::CancellationToken;

/// How an inter-attempt wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    /// The full delay elapsed; the next attempt may start.
    Elapsed,
    /// The token fired first.
    Cancelled,
    /// The deadline passed first.
    DeadlineExceeded,
}

/// Sleeps for `delay` unless `token` fires or `deadline` passes first.
pub(crate) async fn wait(
    delay: Duration,
    token: &CancellationToken,
    deadline: Option<Instant>,
) -> WaitOutcome {
    if token.is_cancelled() {
        return WaitOutcome::Cancelled;
    }

    let sleep = time::sleep(delay);
    tokio::pin!(sleep);

    match deadline {
        Some(at) => {
            if Instant::now() >= at {
                return WaitOutcome::DeadlineExceeded;
            }
            select! {
                biased;
                _ = token.cancelled() => WaitOutcome::Cancelled,
                _ = time::sleep_until(at) => WaitOutcome::DeadlineExceeded,
                _ = &mut sleep => WaitOutcome::Elapsed,
            }
        }
        None => {
            select! {
                biased;
                _ = token.cancelled() => WaitOutcome::Cancelled,
                _ = &mut sleep => WaitOutcome::Elapsed,
            }
        }
    }
}
