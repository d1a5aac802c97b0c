//! Storage backend factory

use crate::adapters::database::traits::SportsStore;
use crate::adapters::memory::InMemoryStore;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::{CourtsyncConfig, DatabaseTarget};
use crate::domain::{Result, SyncError};
use std::sync::Arc;

/// Create the storage backend selected by the configuration
///
/// `application.dry_run` routes every write to an in-memory store regardless
/// of `database_target`. The PostgreSQL pool is not opened here; the first
/// query opens it.
///
/// # Errors
///
/// Returns a configuration error if the PostgreSQL section is missing or its
/// connection string is invalid.
pub fn create_store(config: &CourtsyncConfig) -> Result<Arc<dyn SportsStore>> {
    match config.effective_target() {
        DatabaseTarget::Memory => {
            if config.application.dry_run {
                tracing::info!("DRY RUN: writes go to an in-memory store and are discarded on exit");
            } else {
                tracing::info!("Using in-memory store");
            }
            Ok(Arc::new(InMemoryStore::new()))
        }
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                SyncError::Configuration(
                    "database_target is postgresql but [postgresql] is missing".to_string(),
                )
            })?;

            let client = PostgreSQLClient::new(pg_config.clone())?;
            tracing::info!(
                database = %client.connection_string_safe(),
                "Using PostgreSQL store"
            );
            Ok(Arc::new(PostgreSQLAdapter::new(client)))
        }
    }
}
