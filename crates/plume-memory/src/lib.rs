//! Memory management tool.
//!
//! Batch add/update of a user's stored memories with near-duplicate
//! detection: each candidate either refreshes the closest existing entry or
//! becomes a new one. The host owns the store; this crate only decides and
//! reports.

pub mod reconcile;
pub mod similarity;

pub use reconcile::{
    add_memories, reconcile, MemorySettings, MemoryToolError, ReconcileReport, DEFAULT_THRESHOLD,
};
pub use similarity::sequence_ratio;
