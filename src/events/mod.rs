//! Executor events.
//!
//! This module holds the event **data model** published by the retry executor
//! to its subscribers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publisher**: `core::retrier` (one event per attempt step, one terminal event per call).
//! - **Consumers**: [`Subscribe`](crate::Subscribe) implementations registered on the builder.

mod event;

pub use event::{Event, EventKind};
