//! Domain error types
//!
//! This module defines the error hierarchy for courtsync. Errors are grouped by
//! how the pipeline reacts to them:
//!
//! - transport failures surface as [`ApiError`] once the client has exhausted retries
//! - validation failures reject a whole provider payload and are never retried
//! - row and referential failures are counted by the storage engine and never abort a batch
//! - connectivity failures short-circuit a whole batch before any row is attempted
//!
//! None of the variants expose third-party types.

use std::fmt;

use thiserror::Error;

/// Main courtsync error type
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider request failed after all retry attempts
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Provider payload did not match the expected shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage unreachable before a batch started
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Storage-level failure (query, constraint, pool)
    #[error("Database error: {0}")]
    Database(String),

    /// A single record could not be normalized or written
    #[error("Row error: {0}")]
    Row(String),

    /// A dependent record references a parent that does not exist
    #[error("Referential error: {0}")]
    Referential(String),

    /// Archival process errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl SyncError {
    /// Short taxonomy name, used in audit rows and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Configuration(_) => "configuration",
            SyncError::Api(_) => "transport",
            SyncError::Validation(_) => "validation",
            SyncError::Connectivity(_) => "connectivity",
            SyncError::Database(_) => "database",
            SyncError::Row(_) => "row",
            SyncError::Referential(_) => "referential",
            SyncError::Archive(_) => "archive",
            SyncError::Serialization(_) => "serialization",
            SyncError::Io(_) => "io",
        }
    }

    /// Transport failures worth another attempt; validation and row errors never are
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Api(err) => !err.code.is_client_error(),
            SyncError::Connectivity(_) => true,
            _ => false,
        }
    }

    /// Row-scoped errors are counted and skipped, everything else propagates
    pub fn is_row_scoped(&self) -> bool {
        matches!(self, SyncError::Row(_) | SyncError::Referential(_))
    }
}

/// HTTP status of a failed provider call, or unknown when no response arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    Status(u16),
    Unknown,
}

impl ApiErrorCode {
    /// True for 4xx responses other than 429
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiErrorCode::Status(s) if (400..500).contains(s) && *s != 429)
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorCode::Status(status) => write!(f, "{status}"),
            ApiErrorCode::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Structured provider error surfaced after retry exhaustion
#[derive(Debug, Clone, Error)]
#[error("{code} - {message}")]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Context for a single record that failed during an upsert batch
#[derive(Debug, Clone)]
pub struct RowFailure {
    /// Table the record was destined for
    pub table: String,

    /// Natural key rendered as text, when the record had one
    pub key: Option<String>,

    /// Error message
    pub message: String,

    /// Whether the failure came from the referential guard
    pub referential: bool,
}

impl RowFailure {
    pub fn new(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: None,
            message: message.into(),
            referential: false,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn referential(mut self) -> Self {
        self.referential = true;
        self
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<tokio_postgres::Error> for SyncError {
    fn from(err: tokio_postgres::Error) -> Self {
        SyncError::Database(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for SyncError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        SyncError::Connectivity(format!("Failed to get connection from pool: {err}"))
    }
}
