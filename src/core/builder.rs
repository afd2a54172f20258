use std::sync::Arc;
use std::time::Duration;

use rand::{SeedableRng, rngs::StdRng};
use tokio::time::Instant;

use crate::{
    error::PolicyError,
    policies::RetryPolicy,
    subscribers::{Subscribe, SubscriberSet},
};

use super::retrier::Retrier;

/// Builder for constructing a [`Retrier`] with optional features.
pub struct RetrierBuilder {
    policy: RetryPolicy,
    rng: Option<StdRng>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    name: Option<Arc<str>>,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
    catch_panics: bool,
}

impl RetrierBuilder {
    /// Creates a new builder with the given policy.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            rng: None,
            subscribers: Vec::new(),
            name: None,
            deadline: None,
            timeout: None,
            catch_panics: false,
        }
    }

    /// Replaces the policy.
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Seeds the jitter generator so the delay schedule is reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    /// Injects the jitter generator.
    pub fn rng(mut self, rng: StdRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive every attempt and terminal event, inline and in order.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Names the retrier; the name is attached to every event.
    pub fn name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stops waiting for further attempts once `deadline` has passed.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Like [`deadline`](Self::deadline), relative to the start of each call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Converts a panicking operation into [`RetryError::Panicked`](crate::RetryError::Panicked).
    pub fn catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }

    /// Validates the policy and builds the [`Retrier`].
    ///
    /// Without an explicit [`seed`](Self::seed) or [`rng`](Self::rng), the
    /// generator is seeded from the thread-local entropy source.
    pub fn build(self) -> Result<Retrier, PolicyError> {
        self.policy.validate()?;
        Ok(self.build_unchecked())
    }

    pub(crate) fn build_unchecked(self) -> Retrier {
        let rng = self
            .rng
            .unwrap_or_else(|| StdRng::from_rng(&mut rand::rng()));

        Retrier {
            policy: self.policy,
            rng,
            subs: SubscriberSet::new(self.subscribers),
            name: self.name,
            deadline: self.deadline,
            timeout: self.timeout,
            catch_panics: self.catch_panics,
        }
    }
}
