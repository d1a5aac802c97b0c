//! Sync orchestration
//!
//! - [`record`] - per-run [`SyncRecord`] and its `PENDING -> RUNNING -> terminal` lifecycle
//! - [`orchestrator`] - [`SyncOrchestrator`], the fetch/transform/store sequencer
//! - [`report`] - [`SyncReport`] for composite runs

pub mod orchestrator;
pub mod record;
pub mod report;

pub use orchestrator::{SyncOrchestrator, DAY_PIPELINE};
pub use record::{RunCounts, SyncRecord, SyncStatus};
pub use report::{EntityOutcome, SyncReport};
