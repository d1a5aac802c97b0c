// Courtsync - NBA stats ingest pipeline
// Copyright (c) 2025 Courtsync Contributors
// Licensed under the MIT License

//! # courtsync - NBA stats ingest pipeline
//!
//! courtsync pulls basketball data from a rate-limited HTTP stats provider,
//! normalizes it and upserts it into a relational store with a per-run audit
//! trail. Completed seasons can be copied into archive tables and read back
//! together with live rows through `v_all_*` views.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Transformation, upserts, sync orchestration and archival
//! - [`adapters`] - Provider client and storage backends (PostgreSQL, memory)
//! - [`domain`] - Records, natural keys, seasons and errors
//! - [`config`] - TOML configuration with environment overrides
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courtsync::adapters::database::create_store;
//! use courtsync::adapters::provider::RateLimitedApiClient;
//! use courtsync::config::load_config;
//! use courtsync::core::sync::SyncOrchestrator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("courtsync.toml")?;
//!     let store = create_store(&config)?;
//!     store.ensure_schema().await?;
//!
//!     let client = Arc::new(RateLimitedApiClient::new(&config.provider)?);
//!     let orchestrator = SyncOrchestrator::new(client, store, config.sync.clone());
//!
//!     let record = orchestrator.sync_players().await?;
//!     println!("{}: {} created", record.table_name, record.records_created);
//!     Ok(())
//! }
//! ```
//!
//! ## Seasons
//!
//! A season starts on October 1 and is identified by its starting year:
//!
//! ```rust
//! use chrono::NaiveDate;
//! use courtsync::domain::season_label;
//!
//! let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
//! assert_eq!(season_label(date), "2024-25");
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`], whose error type
//! [`domain::SyncError`] separates configuration, connectivity, provider and
//! validation failures so the CLI can map them to exit codes.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
