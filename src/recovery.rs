//! # Panic recovery for futures.
//!
//! [`catch_panic`] polls a future inside `catch_unwind` and turns a panic into a
//! [`Panicked`] error, so a misbehaving operation surfaces as a value instead of
//! tearing down the caller's task.
//!
//! ```rust
//! use retryvisor::catch_panic;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ok = catch_panic(async { 7 }).await;
//! assert_eq!(ok, Ok(7));
//!
//! let err = catch_panic(async {
//!     if true { panic!("index out of range") }
//!     0
//! })
//! .await
//! .unwrap_err();
//! assert_eq!(err.message, "index out of range");
//! # }
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::Panicked;

/// Runs `fut` to completion, converting a panic into [`Panicked`].
pub async fn catch_panic<F>(fut: F) -> Result<F::Output, Panicked>
where
    F: Future,
{
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .map_err(|payload| Panicked {
            message: panic_message(&*payload),
        })
}

/// Renders a panic payload; `&str` and `String` payloads are kept verbatim.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
