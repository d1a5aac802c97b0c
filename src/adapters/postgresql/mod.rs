//! PostgreSQL storage backend
//!
//! Stores live, archive and audit tables in PostgreSQL through a lazily
//! created deadpool connection pool.

pub mod adapter;
pub mod client;
pub mod models;
pub mod sql;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::PostgreSQLSyncLog;
