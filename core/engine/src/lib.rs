//! DocMirror reconciliation engine.
//!
//! The orchestrator over the local registry and at most one active cloud
//! provider: save/load/list/delete/clear, quota enforcement, the
//! full-set merge algorithm, and the conflict queue consumed by callers.

pub mod engine;
pub mod merge;

pub use engine::{Listing, MirrorEngine, SaveReceipt, StorageInfo};
pub use merge::{merge_listings, MergeOutcome};
