//! Typed data model shared by the queue store, manager, and adapters.
//!
//! Every persisted or in-flight value here is a typed struct/enum, never an
//! untyped map: handlers pattern-match on `ItemMetadata` variants instead of
//! probing string keys.

mod item;
mod job;
mod metadata;

pub use item::{decompose_id, DecomposedId, ItemStatus, ItemType, QueueItem};
pub use job::Job;
pub use metadata::ItemMetadata;
