//! # SubscriberSet: ordered fan-out over multiple subscribers
//!
//! [`SubscriberSet`] delivers each [`Event`] to every registered subscriber and
//! awaits them one after another.
//!
//! ## What it guarantees
//! - Per-call FIFO: subscribers see events in publish order.
//! - Panics inside subscribers are caught and reported on stderr (isolation).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        ├──► S1.on_event().await  (panic caught)
//!        ├──► S2.on_event().await  (panic caught)
//!        └──► SN.on_event().await  (panic caught)
//! ```

use std::sync::Arc;

use futures::FutureExt;

use crate::events::Event;
use crate::recovery::panic_message;

use super::Subscribe;

/// Ordered fan-out with panic isolation.
#[derive(Clone, Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a new set.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Delivers one event to all subscribers.
    pub async fn emit(&self, event: &Event) {
        for sub in &self.subs {
            let fut = sub.on_event(event);
            if let Err(payload) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                eprintln!(
                    "[retryvisor] subscriber '{}' panicked: {}",
                    sub.name(),
                    panic_message(&*payload)
                );
            }
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.len()
    }
}
