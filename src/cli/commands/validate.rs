//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the courtsync configuration file.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::{load_config, redact_url_password, DatabaseTarget};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates every section before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Provider: {}", config.provider.base_url);
        println!("  Season: {}", config.provider.season);
        println!("  Request Delay: {} ms", config.provider.request_delay_ms);
        println!(
            "  Max Retry Attempts: {}",
            config.provider.retry.max_retry_attempts
        );

        match config.effective_target() {
            DatabaseTarget::Memory => println!("  Database Target: memory"),
            DatabaseTarget::PostgreSQL => {
                println!("  Database Target: PostgreSQL");
                if let Some(pg) = &config.postgresql {
                    let raw: &str = pg.connection_string.expose_secret().as_ref();
                    println!("  PostgreSQL Connection: {}", redact_url_password(raw));
                    println!("  Max Connections: {}", pg.max_connections);
                }
            }
        }

        println!("  Sync Entities: {:?}", config.sync.entities);
        println!(
            "  Archive Tables: {}",
            config
                .archive
                .selected_tables()
                .iter()
                .map(|t| t.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();

        Ok(EXIT_OK)
    }
}
