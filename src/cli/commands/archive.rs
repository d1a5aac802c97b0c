//! Archive command implementation

use super::{exit_code_for, open_store, EXIT_CONFIG, EXIT_OK, EXIT_PARTIAL};
use crate::config::load_config;
use crate::core::archive::ArchivalEngine;
use crate::domain::season::label_for_year;
use crate::domain::Table;
use clap::Args;

/// Arguments for the archive command
#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Season start year (2023 archives the 2023-24 season)
    pub season_year: i32,

    /// Override the configured tables (comma-separated)
    #[arg(long)]
    pub tables: Option<String>,
}

impl ArchiveArgs {
    fn parse_tables(&self) -> Result<Option<Vec<Table>>, String> {
        let Some(raw) = &self.tables else {
            return Ok(None);
        };
        raw.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| Table::from_name(name).ok_or_else(|| format!("unknown table '{name}'")))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Execute the archive command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(season_year = self.season_year, "Starting archive command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let tables = match self.parse_tables() {
            Ok(Some(tables)) => tables,
            Ok(None) => config.archive.selected_tables(),
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match open_store(&config).await {
            Ok(store) => store,
            Err(e) => {
                println!("❌ Failed to open storage");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!(
            "📦 Archiving season {} ({} table(s))",
            label_for_year(self.season_year),
            tables.len()
        );
        println!();

        let engine = ArchivalEngine::new(std::sync::Arc::clone(&store), tables);
        let report = match engine.archive_season(self.season_year).await {
            Ok(report) => report,
            Err(e) => {
                println!("❌ Archival failed: {e}");
                store.close().await;
                return Ok(exit_code_for(&e));
            }
        };

        println!(
            "{:<24} {:>10} {:>10} {:>10}",
            "Table", "Archived", "Skipped", "Errors"
        );
        println!("{}", "-".repeat(58));
        for tally in &report.tables {
            println!(
                "{:<24} {:>10} {:>10} {:>10}",
                tally.table.archive_name(),
                tally.archived,
                tally.skipped,
                tally.errors
            );
            if let Some(failure) = &tally.failure {
                println!("  ❌ {failure}");
            }
        }
        println!();
        println!(
            "Archived {} row(s) in {:.2}s",
            report.total_archived(),
            report.duration.as_secs_f64()
        );

        store.close().await;
        Ok(if report.has_failures() {
            EXIT_PARTIAL
        } else {
            EXIT_OK
        })
    }
}
