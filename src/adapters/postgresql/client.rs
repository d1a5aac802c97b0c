//! PostgreSQL client implementation
//!
//! Owns the connection pool. The pool is created on first use; concurrent
//! first callers wait on the same initialization.

use crate::config::redact_url_password;
use crate::config::schema::PostgreSQLConfig;
use crate::domain::{Result, SyncError};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio_postgres::config::SslMode;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

/// PostgreSQL client for courtsync
///
/// Provides pooled connections, schema migration and thin query helpers.
pub struct PostgreSQLClient {
    /// Connection pool, built lazily
    pool: OnceCell<Pool>,

    /// Configuration
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// The connection string is validated here; no connection is opened until
    /// the first query.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the connection string cannot be parsed.
    pub fn new(config: PostgreSQLConfig) -> Result<Self> {
        Self::parse_connection_string(&config)?;
        Ok(Self {
            pool: OnceCell::new(),
            config,
        })
    }

    fn parse_connection_string(config: &PostgreSQLConfig) -> Result<tokio_postgres::Config> {
        let raw: &str = config.connection_string.expose_secret().as_ref();
        let mut pg_config: tokio_postgres::Config = raw.parse().map_err(|e| {
            SyncError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
        })?;

        pg_config.ssl_mode(match config.ssl_mode.as_str() {
            "disable" => SslMode::Disable,
            "require" => SslMode::Require,
            _ => SslMode::Prefer,
        });
        pg_config.options(&format!(
            "-c statement_timeout={}",
            config.statement_timeout_seconds * 1000
        ));
        pg_config.connect_timeout(Duration::from_secs(config.connection_timeout_seconds));

        Ok(pg_config)
    }

    fn build_pool(&self) -> Result<Pool> {
        let pg_config = Self::parse_connection_string(&self.config)?;
        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = if self.config.ssl_mode == "disable" {
            Manager::from_config(pg_config, NoTls, manager_config)
        } else {
            let connector = native_tls::TlsConnector::builder()
                .build()
                .map_err(|e| SyncError::Connectivity(format!("Failed to build TLS connector: {e}")))?;
            Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
        };

        let timeout = Some(Duration::from_secs(self.config.connection_timeout_seconds));
        Pool::builder(manager)
            .max_size(self.config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .build()
            .map_err(|e| SyncError::Connectivity(format!("Failed to create connection pool: {e}")))
    }

    /// The pool, created on first call
    async fn pool(&self) -> Result<&Pool> {
        self.pool
            .get_or_try_init(|| async {
                tracing::debug!(
                    database = %self.connection_string_safe(),
                    max_connections = self.config.max_connections,
                    "Initializing PostgreSQL pool"
                );
                self.build_pool()
            })
            .await
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| SyncError::Connectivity(format!("Connection test failed: {e}")))?;

        tracing::debug!("PostgreSQL connection test successful");
        Ok(())
    }

    /// Runs the live and archive migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;

        for (name, sql) in [
            (
                "001_initial_schema",
                include_str!("../../../migrations/001_initial_schema.sql"),
            ),
            (
                "002_archive_schema",
                include_str!("../../../migrations/002_archive_schema.sql"),
            ),
        ] {
            client
                .batch_execute(sql)
                .await
                .map_err(|e| SyncError::Database(format!("Failed to execute {name}: {e}")))?;
        }

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<Object> {
        Ok(self.pool().await?.get().await?)
    }

    /// Execute a query and return rows
    pub async fn query(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;
        client
            .query(query, params)
            .await
            .map_err(|e| SyncError::Database(format!("Query failed: {e}")))
    }

    /// Execute a query expected to return exactly one row
    pub async fn query_one(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Row> {
        let client = self.get_connection().await?;
        client
            .query_one(query, params)
            .await
            .map_err(|e| SyncError::Database(format!("Query failed: {e}")))
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(&self, statement: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        let client = self.get_connection().await?;
        client
            .execute(statement, params)
            .await
            .map_err(|e| SyncError::Database(format!("Statement execution failed: {e}")))
    }

    /// Get the connection string (without password)
    pub fn connection_string_safe(&self) -> String {
        let raw: &str = self.config.connection_string.expose_secret().as_ref();
        redact_url_password(raw)
    }

    /// Closes the pool if it was ever created
    pub fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close();
            tracing::info!("PostgreSQL pool closed");
        }
    }

    /// Whether the pool has been created yet
    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }
}
