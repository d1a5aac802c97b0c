//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "courtsync.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing courtsync configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            generate_config_with_examples()
        } else {
            generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - MSF_API_KEY for the stats provider");
                println!("     - DATABASE_URL for PostgreSQL");
                println!("  3. Validate configuration: courtsync validate-config");
                println!("  4. Check connectivity: courtsync health");
                println!("  5. Run a sync: courtsync sync");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

fn generate_minimal_config() -> String {
    r#"# courtsync configuration

database_target = "postgresql"  # postgresql | memory

[application]
log_level = "info"
dry_run = false

[provider]
base_url = "https://api.mysportsfeeds.com/v2.1/pull/nba"
api_key = "${MSF_API_KEY}"
season = "current"

[postgresql]
connection_string = "${DATABASE_URL}"

[logging]
local_enabled = false
"#
    .to_string()
}

fn generate_config_with_examples() -> String {
    r#"# courtsync configuration
#
# Values of the form ${NAME} are read from the environment (or a .env file).
# Any key can also be overridden with COURTSYNC_<SECTION>_<KEY>, for example
# COURTSYNC_PROVIDER_SEASON=2024-2025-regular.

# ============================================================================
# Storage backend
# ============================================================================
# postgresql: persistent storage
# memory: in-process only, nothing is kept after the command exits
database_target = "postgresql"

# development | staging | production
environment = "development"

# ============================================================================
# Application
# ============================================================================
[application]
# trace, debug, info, warn, error
log_level = "info"

# Route all writes to the in-memory backend
dry_run = false

# ============================================================================
# Stats provider
# ============================================================================
[provider]
base_url = "https://api.mysportsfeeds.com/v2.1/pull/nba"

# Basic auth: the API key is the user, the password is fixed by the provider
api_key = "${MSF_API_KEY}"
password = "MYSPORTSFEEDS"

# current | latest | upcoming | 2024-2025-regular | ...
season = "current"

# Minimum spacing between two requests
request_delay_ms = 1000

# Per-request timeout
timeout_seconds = 30

# Paginated player listings
page_size = 500

# Pause between pages and between days of a date range
inter_page_delay_ms = 0

[provider.retry]
# Retries after the first attempt; waits 2^attempt * base_delay_ms
max_retry_attempts = 3
base_delay_ms = 1000

# Retry 4xx responses other than 429 as well
retry_client_errors = true

# ============================================================================
# PostgreSQL
# ============================================================================
[postgresql]
connection_string = "${DATABASE_URL}"
max_connections = 10
connection_timeout_seconds = 30
statement_timeout_seconds = 60

# disable | prefer | require
ssl_mode = "prefer"

# ============================================================================
# Sync
# ============================================================================
[sync]
# Order used by `courtsync sync all`; parents must come before children.
# players, games, game_logs, injuries, dfs_projections, daily_dfs
entities = ["players", "games", "injuries", "dfs_projections"]

# Keep going with the next entity after one fails
continue_on_error = true

# ============================================================================
# Archive
# ============================================================================
[archive]
# Tables processed by `courtsync archive`; empty means all
tables = []

# ============================================================================
# Logging
# ============================================================================
[logging]
local_enabled = false
local_path = "/var/log/courtsync"

# daily | hourly | never
local_rotation = "daily"

# JSON console output
console_json = false
"#
    .to_string()
}
