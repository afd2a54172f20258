//! # Retrier: the retry executor.
//!
//! Repeatedly invokes one fallible operation with:
//! - attempt limits per [`RetryPolicy::max_attempts`],
//! - delays per [`RetryPolicy::next_delay`] with jitter from an owned rng,
//! - cooperative cancellation via [`CancellationToken`] (and an optional deadline),
//! - a caller-supplied retryable predicate.
//!
//! ## Event flow
//! For each attempt, the retrier publishes:
//! ```text
//! AttemptStarting → [operation] → Succeeded (Ok)
//!                               → AttemptFailed → Aborted   (predicate says terminal)
//!                                               → Exhausted (last attempt)
//!                                               → BackoffScheduled → [wait] → next attempt
//!                                                                           → Cancelled / DeadlineExceeded
//! ```
//!
//! ## Architecture
//! ```text
//! prev = None, attempt = 0
//! loop {
//!   ├─► publish AttemptStarting
//!   ├─► op().await (never interrupted by the token)
//!   │     ├─► Ok(v)  → Succeeded, return Ok(v)
//!   │     └─► Err(e) → AttemptFailed
//!   ├─► !is_retryable(&e)         → Aborted, return
//!   ├─► attempt == max_attempts   → Exhausted, return
//!   ├─► delay = next_delay(prev, jitter.multiplier(rng))
//!   ├─► publish BackoffScheduled
//!   ├─► wait(delay, token, deadline) → Cancelled / DeadlineExceeded, return
//!   └─► prev = delay, attempt += 1
//! }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** on the caller's task (never parallel)
//! - The token is consulted **only** during the wait
//! - The wait after the final attempt is never computed

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{PolicyError, RetryError},
    events::{Event, EventKind},
    policies::RetryPolicy,
    recovery::catch_panic,
    subscribers::SubscriberSet,
};

use super::{
    builder::RetrierBuilder,
    wait::{WaitOutcome, wait},
};

/// Retry executor.
///
/// Holds the policy, its own jitter generator and the subscribers. Nothing
/// survives between calls apart from the advanced rng state, so two retriers
/// built from the same seed produce the same delay schedule.
///
/// ### Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use retryvisor::{JitterPolicy, Retrier, RetryPolicy};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let policy = RetryPolicy {
///     max_attempts: 2,
///     base_delay: Duration::from_millis(1),
///     max_delay: Duration::from_millis(10),
///     factor: 2.0,
///     jitter: JitterPolicy::None,
/// };
/// let mut retrier = Retrier::new(policy)?;
///
/// let mut calls = 0;
/// let value = retrier
///     .retry(&CancellationToken::new(), || {
///         calls += 1;
///         let n = calls;
///         async move { if n < 2 { Err("not yet") } else { Ok(n) } }
///     })
///     .await?;
///
/// assert_eq!(value, 2);
/// # Ok(())
/// # }
/// ```
pub struct Retrier {
    pub(super) policy: RetryPolicy,
    pub(super) rng: StdRng,
    pub(super) subs: SubscriberSet,
    pub(super) name: Option<Arc<str>>,
    pub(super) deadline: Option<Instant>,
    pub(super) timeout: Option<Duration>,
    pub(super) catch_panics: bool,
}

impl Retrier {
    /// Creates a retrier with an entropy-seeded generator and no subscribers.
    pub fn new(policy: RetryPolicy) -> Result<Self, PolicyError> {
        RetrierBuilder::new(policy).build()
    }

    /// Creates a builder for advanced configuration.
    pub fn builder(policy: RetryPolicy) -> RetrierBuilder {
        RetrierBuilder::new(policy)
    }

    /// Returns the policy this retrier applies.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `op` until it succeeds or the policy gives up; every failure is retryable.
    pub async fn retry<T, E, F, Fut>(
        &mut self,
        token: &CancellationToken,
        op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.retry_if(token, op, |_| true).await
    }

    /// Runs `op` until it succeeds, the policy gives up, or `is_retryable` rejects a failure.
    ///
    /// ### Cancellation semantics
    /// - `token` and the deadline are checked only while waiting between attempts
    /// - An in-flight invocation is never interrupted; honoring the token inside
    ///   the operation is the operation's responsibility
    /// - Cancellation during a wait **aborts it** immediately
    pub async fn retry_if<T, E, F, Fut, P>(
        &mut self,
        token: &CancellationToken,
        mut op: F,
        mut is_retryable: P,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnMut(&E) -> bool,
        E: Display,
    {
        let deadline = self.call_deadline();
        let mut prev_delay: Option<Duration> = None;
        let mut attempt: u32 = 0;

        loop {
            self.publish(|| {
                let ev = Event::new(EventKind::AttemptStarting).with_attempt(attempt);
                match prev_delay {
                    Some(d) => ev.with_delay(d),
                    None => ev,
                }
            })
            .await;

            let res = if self.catch_panics {
                match catch_panic(async { op().await }).await {
                    Ok(res) => res,
                    Err(panicked) => {
                        self.publish(|| {
                            Event::new(EventKind::Panicked)
                                .with_attempt(attempt)
                                .with_error(panicked.message.as_str())
                        })
                        .await;
                        return Err(RetryError::Panicked {
                            attempt,
                            message: panicked.message,
                        });
                    }
                }
            } else {
                op().await
            };

            let error = match res {
                Ok(value) => {
                    self.publish(|| Event::new(EventKind::Succeeded).with_attempt(attempt))
                        .await;
                    return Ok(value);
                }
                Err(error) => error,
            };
            self.publish(|| failure_event(EventKind::AttemptFailed, attempt, &error))
                .await;

            if !is_retryable(&error) {
                self.publish(|| failure_event(EventKind::Aborted, attempt, &error))
                    .await;
                return Err(RetryError::Aborted { attempt, error });
            }
            if attempt >= self.policy.max_attempts {
                self.publish(|| failure_event(EventKind::Exhausted, attempt, &error))
                    .await;
                return Err(RetryError::Exhausted {
                    attempts: attempt.saturating_add(1),
                    error,
                });
            }

            let multiplier = self.policy.jitter.multiplier(&mut self.rng);
            let delay = self.policy.next_delay(prev_delay, multiplier);
            self.publish(|| failure_event(EventKind::BackoffScheduled, attempt, &error).with_delay(delay))
                .await;

            match wait(delay, token, deadline).await {
                WaitOutcome::Elapsed => {}
                WaitOutcome::Cancelled => {
                    self.publish(|| Event::new(EventKind::Cancelled).with_attempt(attempt))
                        .await;
                    return Err(RetryError::Cancelled {
                        attempts: attempt.saturating_add(1),
                    });
                }
                WaitOutcome::DeadlineExceeded => {
                    self.publish(|| Event::new(EventKind::DeadlineExceeded).with_attempt(attempt))
                        .await;
                    return Err(RetryError::DeadlineExceeded {
                        attempts: attempt.saturating_add(1),
                    });
                }
            }

            prev_delay = Some(delay);
            attempt += 1;
        }
    }

    /// Earliest of the absolute deadline and `now + timeout`.
    fn call_deadline(&self) -> Option<Instant> {
        let relative = self.timeout.map(|t| Instant::now() + t);
        match (self.deadline, relative) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Builds and delivers an event; skipped entirely without subscribers.
    async fn publish(&self, build: impl FnOnce() -> Event) {
        if self.subs.is_empty() {
            return;
        }
        let ev = build();
        let ev = match &self.name {
            Some(name) => ev.with_retrier(Arc::clone(name)),
            None => ev,
        };
        self.subs.emit(&ev).await;
    }
}

fn failure_event<E: Display>(kind: EventKind, attempt: u32, error: &E) -> Event {
    Event::new(kind)
        .with_attempt(attempt)
        .with_error(error.to_string())
}

/// Retries `op` under `policy` with a fresh, entropy-seeded retrier.
///
/// The policy is used as given; call [`RetryPolicy::validate`] first when it
/// comes from untrusted input.
pub async fn retry<T, E, F, Fut>(
    token: &CancellationToken,
    policy: RetryPolicy,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    RetrierBuilder::new(policy)
        .build_unchecked()
        .retry(token, op)
        .await
}

/// Like [`retry`], with a retryable predicate.
pub async fn retry_if<T, E, F, Fut, P>(
    token: &CancellationToken,
    policy: RetryPolicy,
    op: F,
    is_retryable: P,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
    E: Display,
{
    RetrierBuilder::new(policy)
        .build_unchecked()
        .retry_if(token, op, is_retryable)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JitterPolicy, Subscribe};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Event>>);

    impl Recorder {
        fn kinds(&self) -> Vec<EventKind> {
            self.0.lock().unwrap().iter().map(|e| e.kind).collect()
        }

        fn backoffs(&self) -> Vec<Duration> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.kind == EventKind::BackoffScheduled)
                .filter_map(|e| e.delay)
                .collect()
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.clone());
        }
    }

    fn scenario_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    fn recorded(policy: RetryPolicy) -> (Retrier, Arc<Recorder>) {
        let rec = Arc::new(Recorder::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![rec.clone()];
        let retrier = Retrier::builder(policy)
            .seed(11)
            .name("test")
            .with_subscribers(subs)
            .build()
            .unwrap();
        (retrier, rec)
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_fourth_attempt_after_700ms() {
        let mut retrier = Retrier::new(scenario_policy()).unwrap();
        let token = CancellationToken::new();
        let start = Instant::now();

        let mut calls = 0u32;
        let res = retrier
            .retry(&token, || {
                calls += 1;
                let n = calls;
                async move {
                    if n <= 3 {
                        Err(format!("boom #{n}"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(res.unwrap(), 4);
        assert_eq!(calls, 4);
        assert_eq!(start.elapsed(), Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_returns_last_failure() {
        let mut retrier = Retrier::new(scenario_policy()).unwrap();
        let token = CancellationToken::new();
        let start = Instant::now();

        let mut calls = 0u32;
        let res: Result<(), _> = retrier
            .retry(&token, || {
                calls += 1;
                let n = calls;
                async move { Err(format!("boom #{n}")) }
            })
            .await;

        let err = res.unwrap_err();
        assert_eq!(err.as_label(), "retry_exhausted");
        assert_eq!(err.attempts(), 4);
        assert_eq!(err.into_error().as_deref(), Some("boom #4"));
        assert_eq!(calls, 4);
        assert_eq!(start.elapsed(), Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invocations_are_max_attempts_plus_one() {
        for n in 0..6 {
            let mut policy = scenario_policy();
            policy.max_attempts = n;
            let mut retrier = Retrier::new(policy).unwrap();

            let mut calls = 0u32;
            let res: Result<(), RetryError<&str>> = retrier
                .retry(&CancellationToken::new(), || {
                    calls += 1;
                    async { Err("down") }
                })
                .await;

            assert!(res.is_err());
            assert_eq!(calls, n + 1, "max_attempts={n}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_attempt_k_stops_immediately() {
        for k in 0..=3u32 {
            let (mut retrier, rec) = recorded(scenario_policy());
            let mut calls = 0u32;
            let res = retrier
                .retry(&CancellationToken::new(), || {
                    let idx = calls;
                    calls += 1;
                    async move { if idx < k { Err("flaky") } else { Ok(idx) } }
                })
                .await;

            assert_eq!(res.unwrap(), k);
            assert_eq!(calls, k + 1);
            assert_eq!(rec.backoffs().len(), k as usize);
            assert_eq!(rec.kinds().last(), Some(&EventKind::Succeeded));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_attempts_zero_never_waits() {
        let mut policy = scenario_policy();
        policy.max_attempts = 0;
        let (mut retrier, rec) = recorded(policy);
        let start = Instant::now();

        let res: Result<(), _> = retrier
            .retry(&CancellationToken::new(), || async { Err("once") })
            .await;

        assert!(matches!(res, Err(RetryError::Exhausted { attempts: 1, .. })));
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(
            rec.kinds(),
            vec![
                EventKind::AttemptStarting,
                EventKind::AttemptFailed,
                EventKind::Exhausted
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_stops_after_one_invocation() {
        let mut policy = scenario_policy();
        policy.max_attempts = 10;
        let mut retrier = Retrier::new(policy).unwrap();

        let mut calls = 0u32;
        let res: Result<(), _> = retrier
            .retry_if(
                &CancellationToken::new(),
                || {
                    calls += 1;
                    async { Err("permission denied") }
                },
                |e: &&str| !e.contains("denied"),
            )
            .await;

        let err = res.unwrap_err();
        assert!(matches!(err, RetryError::Aborted { attempt: 0, .. }));
        assert_eq!(err.error_ref(), Some(&"permission denied"));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_first_wait() {
        let mut policy = scenario_policy();
        policy.max_attempts = 5;
        let (mut retrier, rec) = recorded(policy);

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let mut calls = 0u32;
        let res: Result<(), _> = retrier
            .retry(&token, || {
                calls += 1;
                async { Err("unavailable") }
            })
            .await;

        let err = res.unwrap_err();
        assert!(matches!(err, RetryError::Cancelled { attempts: 1 }));
        assert!(err.error_ref().is_none());
        assert_eq!(calls, 1);
        assert_eq!(start.elapsed(), Duration::from_millis(50));
        assert_eq!(rec.kinds().last(), Some(&EventKind::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_does_not_interrupt_first_attempt() {
        let mut retrier = Retrier::new(scenario_policy()).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let res = retrier
            .retry(&token, || async { Ok::<_, &str>("ran") })
            .await;
        assert_eq!(res.unwrap(), "ran");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_wait() {
        let mut retrier = Retrier::builder(scenario_policy())
            .timeout(Duration::from_millis(250))
            .build()
            .unwrap();
        let start = Instant::now();

        let mut calls = 0u32;
        let res: Result<(), _> = retrier
            .retry(&CancellationToken::new(), || {
                calls += 1;
                async { Err("slow") }
            })
            .await;

        assert!(matches!(res, Err(RetryError::DeadlineExceeded { attempts: 2 })));
        assert_eq!(calls, 2);
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_never_exceed_max_delay() {
        let policy = RetryPolicy {
            max_attempts: 12,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(300),
            factor: 3.0,
            jitter: JitterPolicy::Fraction(1.0),
        };
        let (mut retrier, rec) = recorded(policy);

        let res: Result<(), _> = retrier
            .retry(&CancellationToken::new(), || async { Err("nope") })
            .await;

        assert!(res.is_err());
        let waits = rec.backoffs();
        assert_eq!(waits.len(), 12);
        assert!(waits.iter().all(|d| *d <= Duration::from_millis(300)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_seed_same_schedule() {
        let mut policy = scenario_policy();
        policy.jitter = JitterPolicy::Fraction(0.3);

        let (mut a, rec_a) = recorded(policy);
        let (mut b, rec_b) = recorded(policy);
        let token = CancellationToken::new();

        let _: Result<(), _> = a.retry(&token, || async { Err("x") }).await;
        let _: Result<(), _> = b.retry(&token, || async { Err("x") }).await;

        assert_eq!(rec_a.backoffs().len(), 3);
        assert_eq!(rec_a.backoffs(), rec_b.backoffs());
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_sequence_for_flaky_operation() {
        let (mut retrier, rec) = recorded(scenario_policy());
        let mut calls = 0u32;
        let res = retrier
            .retry(&CancellationToken::new(), || {
                calls += 1;
                let n = calls;
                async move { if n < 2 { Err("flaky") } else { Ok(()) } }
            })
            .await;

        assert!(res.is_ok());
        assert_eq!(
            rec.kinds(),
            vec![
                EventKind::AttemptStarting,
                EventKind::AttemptFailed,
                EventKind::BackoffScheduled,
                EventKind::AttemptStarting,
                EventKind::Succeeded,
            ]
        );

        let events = rec.0.lock().unwrap();
        assert!(events.iter().all(|e| e.retrier.as_deref() == Some("test")));
        assert_eq!(events[3].delay, Some(Duration::from_millis(100)));
        assert_eq!(events[1].error.as_deref(), Some("flaky"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_captured_when_enabled() {
        let mut retrier = Retrier::builder(scenario_policy())
            .catch_panics(true)
            .build()
            .unwrap();

        let mut calls = 0u32;
        let res: Result<(), RetryError<&str>> = retrier
            .retry(&CancellationToken::new(), || {
                calls += 1;
                async {
                    if true {
                        panic!("corrupt state");
                    }
                    Ok(())
                }
            })
            .await;

        match res {
            Err(RetryError::Panicked { attempt, message }) => {
                assert_eq!(attempt, 0);
                assert_eq!(message, "corrupt state");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_while_building_future_captured() {
        let mut retrier = Retrier::builder(scenario_policy())
            .catch_panics(true)
            .build()
            .unwrap();

        let res: Result<(), RetryError<&str>> = retrier
            .retry(&CancellationToken::new(), || -> std::future::Ready<Result<(), &str>> {
                panic!("bad connection string")
            })
            .await;

        assert!(matches!(
            res,
            Err(RetryError::Panicked { attempt: 0, ref message }) if message == "bad connection string"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_free_function_retries() {
        let mut calls = 0u32;
        let res = retry(&CancellationToken::new(), scenario_policy(), || {
            calls += 1;
            let n = calls;
            async move { if n < 3 { Err("again") } else { Ok("done") } }
        })
        .await;

        assert_eq!(res.unwrap(), "done");
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let mut policy = scenario_policy();
        policy.factor = 0.5;
        assert!(matches!(
            Retrier::new(policy),
            Err(PolicyError::FactorTooSmall { .. })
        ));
    }
}
