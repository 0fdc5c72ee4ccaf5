//! Durable queue store (SQLite via sqlx).
//!
//! Maps `jobId -> QueueItem` with indices on `status`, `parent_id`, and the
//! composite, plus append-only history and failed-track tables. The store
//! performs no retry scheduling, status transitions, or progress arithmetic
//! beyond read/write of whatever the caller hands it — that belongs to the
//! manager.

mod store;

pub use store::{FailedTrackRecord, HistoryRecord, QueueStore};
