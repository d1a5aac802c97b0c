//! Health command implementation
//!
//! Checks that the provider answers and that storage is reachable.

use super::{EXIT_CONFIG, EXIT_CONNECTION, EXIT_OK};
use crate::adapters::database::create_store;
use crate::adapters::provider::RateLimitedApiClient;
use crate::config::load_config;
use clap::Args;

/// Arguments for the health command
#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Skip the provider check
    #[arg(long)]
    pub storage_only: bool,
}

impl HealthArgs {
    /// Execute the health command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Running health check");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let mut healthy = true;

        if !self.storage_only {
            let client = RateLimitedApiClient::new(&config.provider)?;
            if client.health_check().await {
                println!("✅ Provider reachable: {}", client.base_url());
            } else {
                println!("❌ Provider unreachable: {}", client.base_url());
                healthy = false;
            }
        }

        let store = match create_store(&config) {
            Ok(store) => store,
            Err(e) => {
                println!("❌ Storage misconfigured: {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        match store.test_connection().await {
            Ok(()) => println!("✅ Storage reachable ({})", store.backend_name()),
            Err(e) => {
                println!("❌ Storage unreachable ({}): {e}", store.backend_name());
                healthy = false;
            }
        }
        store.close().await;

        Ok(if healthy { EXIT_OK } else { EXIT_CONNECTION })
    }
}
