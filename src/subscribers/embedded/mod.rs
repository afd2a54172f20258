//! # Built-in subscribers
//!
//! - [`LogWriter`]: prints one line per executor event (demo/debug).

mod log;

pub use log::LogWriter;
