//! Database abstraction layer
//!
//! The sync and archival engines talk to storage only through
//! [`SportsStore`], so PostgreSQL and the in-memory backend are
//! interchangeable.

pub mod factory;
pub mod traits;

pub use factory::create_store;
pub use traits::{
    ArchiveInsert, DataSource, SeasonRow, SportsStore, TableStats, UpsertOutcome, ViewRow,
};
