//! Sync audit trail
//!
//! Every sync and archive run leaves one row in `data_sync_logs`.

mod trail;

pub use trail::SyncAuditLog;
