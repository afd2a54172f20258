//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [starting] retrier="fetch" attempt=0
//! [failed] retrier="fetch" err="connection refused" attempt=0
//! [backoff] retrier="fetch" delay=100ms after_attempt=0 err="connection refused"
//! [starting] retrier="fetch" attempt=1 waited=100ms
//! [succeeded] retrier="fetch" attempt=1
//! [exhausted] retrier="fetch" attempt=3 err="connection refused"
//! [cancelled] retrier="fetch" after_attempt=0
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let name = e.retrier.as_deref().unwrap_or("retrier");
        let attempt = e.attempt.unwrap_or_default();
        let err = e.error.as_deref().unwrap_or("");

        match e.kind {
            EventKind::AttemptStarting => match e.delay {
                Some(waited) => {
                    println!("[starting] retrier={name:?} attempt={attempt} waited={waited:?}")
                }
                None => println!("[starting] retrier={name:?} attempt={attempt}"),
            },
            EventKind::AttemptFailed => {
                println!("[failed] retrier={name:?} err={err:?} attempt={attempt}");
            }
            EventKind::BackoffScheduled => {
                println!(
                    "[backoff] retrier={name:?} delay={:?} after_attempt={attempt} err={err:?}",
                    e.delay.unwrap_or_default()
                );
            }
            EventKind::Succeeded => {
                println!("[succeeded] retrier={name:?} attempt={attempt}");
            }
            EventKind::Exhausted => {
                println!("[exhausted] retrier={name:?} attempt={attempt} err={err:?}");
            }
            EventKind::Aborted => {
                println!("[aborted] retrier={name:?} attempt={attempt} err={err:?}");
            }
            EventKind::Cancelled => {
                println!("[cancelled] retrier={name:?} after_attempt={attempt}");
            }
            EventKind::DeadlineExceeded => {
                println!("[deadline-exceeded] retrier={name:?} after_attempt={attempt}");
            }
            EventKind::Panicked => {
                println!("[panicked] retrier={name:?} attempt={attempt} info={err}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
