//! # Event subscribers for the retry executor.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] used by
//! the executor to deliver events, and built-in implementations.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Retrier ── emit(Event) ──► SubscriberSet ──► Subscribe::on_event(&Event)
//!                                                      │
//!                                                 ┌────┴────┬─────────┐
//!                                                 ▼         ▼         ▼
//!                                              LogWriter  Metrics  Custom
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod embedded;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
