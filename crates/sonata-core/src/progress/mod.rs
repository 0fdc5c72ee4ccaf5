//! Progress computation and broadcast.
//!
//! Maintains per-item `DownloadStats` (speed/ETA), throttles the raw
//! byte-level callback from the streaming processor down to a bounded update
//! rate, and serializes subscriber management through a single-writer
//! coordinator loop.

mod notifier;
mod stats;
mod throttle;

pub use notifier::{NotifierEvent, NotifierHandle, NotifierSnapshot, ProgressNotifier, StatusKind};
pub use stats::DownloadStats;
pub use throttle::Throttled;
