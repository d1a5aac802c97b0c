//! CLI command implementations
//!
//! Commands return the process exit code:
//! 0 success, 1 partial, 2 configuration, 3 validation, 4 connection, 5 fatal.

pub mod archive;
pub mod health;
pub mod init;
pub mod status;
pub mod sync;
pub mod validate;

use crate::adapters::database::{create_store, SportsStore};
use crate::config::CourtsyncConfig;
use crate::domain::SyncError;
use std::sync::Arc;

pub const EXIT_OK: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_VALIDATION: i32 = 3;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for an error kind as returned by [`SyncError::kind`]
pub fn exit_code_for_kind(kind: &str) -> i32 {
    match kind {
        "configuration" => EXIT_CONFIG,
        "validation" => EXIT_VALIDATION,
        "connectivity" | "database" | "transport" => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

pub fn exit_code_for(error: &SyncError) -> i32 {
    exit_code_for_kind(error.kind())
}

/// Opens the configured store and makes sure the schema exists
pub(crate) async fn open_store(config: &CourtsyncConfig) -> Result<Arc<dyn SportsStore>, SyncError> {
    let store = create_store(config)?;
    store.ensure_schema().await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiError, ApiErrorCode};

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&SyncError::Configuration("x".to_string())),
            EXIT_CONFIG
        );
        assert_eq!(
            exit_code_for(&SyncError::Validation("x".to_string())),
            EXIT_VALIDATION
        );
        assert_eq!(
            exit_code_for(&SyncError::Api(ApiError::new(ApiErrorCode::Unknown, "timeout"))),
            EXIT_CONNECTION
        );
        assert_eq!(exit_code_for(&SyncError::Io("x".to_string())), EXIT_FATAL);
    }
}
