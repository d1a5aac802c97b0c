//! Configuration management for courtsync.
//!
//! courtsync uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `COURTSYNC_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Per-section validation
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//!
//! [provider]
//! base_url = "https://api.mysportsfeeds.com/v2.1/pull/nba"
//! api_key = "${MSF_API_KEY}"
//! season = "current"
//! request_delay_ms = 1000
//!
//! [provider.retry]
//! max_retry_attempts = 3
//!
//! [postgresql]
//! connection_string = "${DATABASE_URL}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ArchiveConfig, CourtsyncConfig, DatabaseTarget, Environment,
    LoggingConfig, PostgreSQLConfig, ProviderConfig, RetryConfig, SyncConfig, SyncEntity,
};
pub use secret::{redact_url_password, secret_string, SecretString, SecretValue};

impl CourtsyncConfig {
    /// Loads and validates a configuration file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::domain::Result<Self> {
        load_config(path)
    }
}
