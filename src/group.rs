//! # ErrorGroup: concurrent jobs with first-error collection.
//!
//! [`ErrorGroup`] runs several fallible jobs on the tokio runtime, hands each
//! one the group's [`CancellationToken`], and reports failures when joined.
//!
//! ## Modes
//! - [`ErrorGroup::wait`] returns the **first** failure and cancels the token so
//!   the remaining jobs can stop cooperatively; later failures are ignored.
//! - [`ErrorGroup::wait_all`] never cancels and returns **every** failure.
//!
//! ## Rules
//! - Jobs are wrapped in [`catch_panic`]: a panicking job becomes
//!   [`GroupError::Panicked`] and never poisons the group.
//! - Failures are reported in completion order.
//! - Cancellation is cooperative; a job that ignores the token runs to completion.
//!
//! ## Example
//! ```rust
//! use retryvisor::{ErrorGroup, GroupError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut group = ErrorGroup::new();
//! group.spawn("ok", |_token| async { Ok(()) });
//! group.spawn("bad", |_token| async { Err("disk full") });
//!
//! match group.wait().await {
//!     Err(GroupError::Failed { job, error }) => {
//!         assert_eq!(job, "bad");
//!         assert_eq!(error, "disk full");
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! # }
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{GroupError, Panicked};
use crate::recovery::{catch_panic, panic_message};

type JobOutput<E> = (String, Result<Result<(), E>, Panicked>);

/// A set of concurrent jobs sharing one cancellation token.
pub struct ErrorGroup<E> {
    jobs: JoinSet<JobOutput<E>>,
    token: CancellationToken,
}

impl<E: Send + 'static> Default for ErrorGroup<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send + 'static> ErrorGroup<E> {
    /// Creates a group with a fresh token.
    pub fn new() -> Self {
        Self::with_token(&CancellationToken::new())
    }

    /// Creates a group whose token is a child of `parent`.
    ///
    /// Cancelling `parent` cancels the group; a group failure never cancels `parent`.
    pub fn with_token(parent: &CancellationToken) -> Self {
        Self {
            jobs: JoinSet::new(),
            token: parent.child_token(),
        }
    }

    /// Returns the token handed to every job.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Starts a job on the current runtime.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn spawn<F, Fut>(&mut self, name: impl Into<String>, job: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        let name = name.into();
        let token = self.token.clone();
        match std::panic::catch_unwind(AssertUnwindSafe(|| job(token))) {
            Ok(fut) => {
                self.jobs.spawn(async move { (name, catch_panic(fut).await) });
            }
            Err(payload) => {
                let panicked = Panicked {
                    message: panic_message(&*payload),
                };
                self.jobs.spawn(async move { (name, Err(panicked)) });
            }
        }
    }

    /// Number of jobs not yet joined.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// True if there are no jobs left to join.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Waits for every job and returns the first failure.
    ///
    /// The first failure cancels the group token.
    pub async fn wait(mut self) -> Result<(), GroupError<E>> {
        let mut first = None;
        while let Some(failure) = self.join_next_failure().await {
            if first.is_some() {
                continue;
            }
            if let Some(failure) = failure {
                self.token.cancel();
                first = Some(failure);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Waits for every job and returns all failures in completion order.
    ///
    /// An empty vector means every job succeeded.
    pub async fn wait_all(mut self) -> Vec<GroupError<E>> {
        let mut failures = Vec::new();
        while let Some(failure) = self.join_next_failure().await {
            failures.extend(failure);
        }
        failures
    }

    /// Joins the next job: `None` when the set is drained, `Some(None)` for a success.
    async fn join_next_failure(&mut self) -> Option<Option<GroupError<E>>> {
        let joined = self.jobs.join_next().await?;
        Some(match joined {
            Ok((_, Ok(Ok(())))) => None,
            Ok((job, Ok(Err(error)))) => Some(GroupError::Failed { job, error }),
            Ok((job, Err(panicked))) => Some(GroupError::Panicked {
                job,
                message: panicked.message,
            }),
            Err(join_err) => Some(GroupError::Panicked {
                job: "unknown".to_string(),
                message: join_err.to_string(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    #[tokio::test(start_paused = true)]
    async fn test_all_succeed() {
        let mut group: ErrorGroup<String> = ErrorGroup::new();
        for i in 1..=3u64 {
            group.spawn(format!("worker-{i}"), move |_| async move {
                sleep(Duration::from_millis(100 * i)).await;
                Ok(())
            });
        }
        assert_eq!(group.len(), 3);
        assert!(group.wait().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_cancels_siblings() {
        let mut group: ErrorGroup<String> = ErrorGroup::new();
        let token = group.token().clone();

        for i in 1..=3u64 {
            group.spawn(format!("worker-{i}"), move |token| async move {
                tokio::select! {
                    _ = sleep(Duration::from_secs(i)) => {}
                    _ = token.cancelled() => {
                        return Err(format!("worker {i} cancelled"));
                    }
                }
                if i == 1 {
                    return Err(format!("worker {i}: critical error"));
                }
                Ok(())
            });
        }

        let start = Instant::now();
        let err = group.wait().await.unwrap_err();

        assert_eq!(err.job(), "worker-1");
        assert!(matches!(err, GroupError::Failed { ref error, .. } if error == "worker 1: critical error"));
        assert!(token.is_cancelled());
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_job_reported() {
        let mut group: ErrorGroup<&'static str> = ErrorGroup::new();
        group.spawn("steady", |_| async { Ok(()) });
        group.spawn("crashy", |_| async {
            if true {
                panic!("nil map");
            }
            Ok(())
        });

        match group.wait().await {
            Err(GroupError::Panicked { job, message }) => {
                assert_eq!(job, "crashy");
                assert_eq!(message, "nil map");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_while_building_job_reported() {
        let mut group: ErrorGroup<&'static str> = ErrorGroup::new();
        group.spawn("steady", |_| async { Ok(()) });
        group.spawn(
            "eager",
            |_| -> std::future::Ready<Result<(), &'static str>> { panic!("missing config") },
        );

        match group.wait().await {
            Err(GroupError::Panicked { job, message }) => {
                assert_eq!(job, "eager");
                assert_eq!(message, "missing config");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_all_collects_every_failure() {
        let mut group: ErrorGroup<String> = ErrorGroup::new();
        let token = group.token().clone();
        for i in 1..=3u64 {
            group.spawn(format!("op-{i}"), move |_| async move {
                sleep(Duration::from_millis(10 * i)).await;
                if i == 2 {
                    Ok(())
                } else {
                    Err(format!("operation {i} failed"))
                }
            });
        }

        let failures = group.wait_all().await;
        let jobs: Vec<&str> = failures.iter().map(|f| f.job()).collect();
        assert_eq!(jobs, vec!["op-1", "op-3"]);
        assert!(!token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancellation_reaches_jobs() {
        let parent = CancellationToken::new();
        let mut group: ErrorGroup<String> = ErrorGroup::with_token(&parent);
        group.spawn("listener", |token| async move {
            token.cancelled().await;
            Ok(())
        });

        parent.cancel();
        assert!(group.wait().await.is_ok());
    }
}
