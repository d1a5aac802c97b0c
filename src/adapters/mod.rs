//! External system integrations for courtsync.
//!
//! - [`provider`] - rate-limited HTTP client for the stats provider
//! - [`database`] - storage abstraction ([`database::SportsStore`]) and backend factory
//! - [`postgresql`] - PostgreSQL backend
//! - [`memory`] - in-memory backend for dry runs and tests
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the core pipeline
//! can be exercised against the in-memory backend.
//!
//! ```rust,no_run
//! use courtsync::adapters::database::SportsStore;
//! use courtsync::adapters::memory::InMemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> courtsync::domain::Result<()> {
//! let store: Arc<dyn SportsStore> = Arc::new(InMemoryStore::new());
//! store.ensure_schema().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
pub mod provider;
