//! Domain models and types for courtsync.
//!
//! The domain layer provides:
//! - **Error types** ([`SyncError`], [`ApiError`], [`RowFailure`])
//! - **Natural keys** ([`NaturalKey`], [`KeyPart`])
//! - **Normalized records** ([`Team`], [`Player`], [`Game`], [`GameLog`], [`Injury`],
//!   [`DfsProjection`], [`DailyDfsEntry`], [`GameLineupEntry`])
//! - **Season and team rules** ([`season`], [`teams`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SyncError>`]:
//!
//! ```rust
//! use courtsync::domain::{Result, SyncError};
//!
//! fn example() -> Result<()> {
//!     Err(SyncError::Validation("players array missing".to_string()))
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod records;
pub mod result;
pub mod season;
pub mod teams;

pub use errors::{ApiError, ApiErrorCode, RowFailure, SyncError};
pub use ids::{KeyPart, NaturalKey};
pub use records::{
    ArchiveScope, DailyDfsEntry, DfsProjection, ExternalMapping, Game, GameLineupEntry, GameLog,
    Injury, ParentRef, Player, SourcePoints, StoredRecord, Table, Team, Venue,
};
pub use result::Result;
pub use season::{season_label, season_year, SeasonWindow};
pub use teams::normalize_abbreviation;
