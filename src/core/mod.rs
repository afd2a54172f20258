//! Executor core: the retry loop and its wait.
//!
//! The public API from this module is [`Retrier`] (with [`RetrierBuilder`]) and
//! the one-shot helpers [`retry`] / [`retry_if`].
//!
//! Internal modules:
//! - [`retrier`]: runs the attempt loop, applies the policy, publishes events;
//! - [`wait`]: cancellable inter-attempt sleep (token + deadline);
//! - [`builder`]: wires policy, rng, subscribers, deadline and panic capture.

mod builder;
mod retrier;
mod wait;

pub use builder::RetrierBuilder;
pub use retrier::{Retrier, retry, retry_if};
