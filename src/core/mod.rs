//! Core business logic for courtsync.
//!
//! # Modules
//!
//! - [`transform`] - Pure normalization of provider payloads into storage records
//! - [`storage`] - Per-row upserts with connectivity pre-flight and referential guard
//! - [`sync`] - Sync orchestration, run records and composite reports
//! - [`archive`] - Copy-based season archival and `v_all_*` view reads
//! - [`audit`] - The `data_sync_logs` audit trail
//!
//! # Sync Workflow
//!
//! 1. **Fetch**: call the provider through the rate-limited client
//! 2. **Transform**: normalize the payload, collecting teams and venues
//! 3. **Store teams**: upsert discovered teams before their dependents
//! 4. **Store entities**: upsert row by row and tally created/updated/errors
//! 5. **Audit**: write one `SyncRecord` per entity type, failures included
//!
//! # Example
//!
//! ```rust,no_run
//! use courtsync::adapters::database::create_store;
//! use courtsync::adapters::provider::RateLimitedApiClient;
//! use courtsync::config::load_config;
//! use courtsync::core::sync::SyncOrchestrator;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("courtsync.toml")?;
//! let store = create_store(&config)?;
//! let client = Arc::new(RateLimitedApiClient::new(&config.provider)?);
//!
//! let orchestrator = SyncOrchestrator::new(client, store, config.sync.clone());
//! let report = orchestrator.sync_all(chrono::Utc::now().date_naive()).await;
//!
//! println!("Created {} rows", report.total_created());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod audit;
pub mod storage;
pub mod sync;
pub mod transform;
