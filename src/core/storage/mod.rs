//! Storage engine
//!
//! Generic per-row upserts over a [`SportsStore`](crate::adapters::database::SportsStore)
//! backend, with connectivity pre-flight and a referential guard.

pub mod upsert;

pub use upsert::{UpsertStorageEngine, UpsertTally};
