//! # Example: retry_with_backoff
//!
//! Demonstrates how [`Retrier`] retries a flaky operation according to
//! [`RetryPolicy`], and how a caller's [`CancellationToken`] cuts the wait short.
//!
//! The operation fails twice before succeeding, showing how backoff delay
//! and jitter are applied between retries.
//!
//! ## Flow
//! ```text
//! Retrier::retry()
//!   ├─► publish(AttemptStarting, attempt=0)
//!   ├─► op() → Err("connection refused #1")
//!   ├─► publish(AttemptFailed)
//!   ├─► publish(BackoffScheduled{delay≈100ms})
//!   ├─► wait(delay)
//!   ├─► retry → attempt=1
//!   │     ├─► op() → Err("connection refused #2")
//!   │     ├─► publish(BackoffScheduled{delay≈200ms})
//!   │     └─► wait(delay)
//!   └─► retry → attempt=2 → Ok(payload) → publish(Succeeded)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry_with_backoff --features logging
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use retryvisor::{JitterPolicy, LogWriter, Retrier, RetryError, RetryPolicy, Subscribe};
use tokio_util::sync::CancellationToken;

static CALLS: AtomicU32 = AtomicU32::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Backoff: exponential with ±20% jitter
    let policy = RetryPolicy {
        max_attempts: 4,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(2),
        factor: 2.0,
        jitter: JitterPolicy::Fraction(0.2),
    };

    // 2. Attach the built-in LogWriter
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mut retrier = Retrier::builder(policy)
        .name("flaky-fetch")
        .with_subscribers(subs)
        .build()?;

    // 3. Flaky operation: fails twice, then succeeds
    let token = CancellationToken::new();
    let body = retrier
        .retry(&token, || async {
            let n = CALLS.fetch_add(1, Ordering::Relaxed) + 1;
            if n <= 2 {
                Err(format!("connection refused #{n}"))
            } else {
                Ok(format!("payload after {n} calls"))
            }
        })
        .await?;
    println!("[main] got {body:?}");

    // 4. Cancellation: the caller gives up 150ms into the first wait
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        canceller.cancel();
    });

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mut slow = Retrier::builder(RetryPolicy {
        base_delay: Duration::from_secs(1),
        ..policy
    })
    .name("slow-fetch")
    .with_subscribers(subs)
    .build()?;

    let res: Result<(), RetryError<&str>> = slow
        .retry(&token, || async { Err("service unavailable") })
        .await;
    match res {
        Err(e) if e.is_cancelled() => println!("[main] gave up waiting: {e}"),
        other => println!("[main] unexpected: {other:?}"),
    }

    println!("[main] done.");
    Ok(())
}
