//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom event handlers
//! (logging, metrics, test probes) into the retry executor.
//!
//! ## Rules
//! - Events are delivered **inline**: the executor awaits every subscriber,
//!   in registration order, before it continues.
//! - A panicking subscriber is isolated; the event is dropped for it only and
//!   the call carries on.
//! - Events from one call arrive in order (FIFO).
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use retryvisor::{Event, EventKind, Subscribe};
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Subscribe for Metrics {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::AttemptFailed) {
//!             // export a metric, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "metrics" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for executor observability.
///
/// ### Implementation requirements
/// - Keep processing short; the executor waits for it.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
