//! Status command implementation
//!
//! Prints the most recent `data_sync_logs` rows and the row counts of the
//! live and archive tables.

use super::{exit_code_for, open_store, EXIT_CONFIG, EXIT_OK};
use crate::adapters::database::TableStats;
use crate::config::load_config;
use crate::core::archive::ArchivalEngine;
use crate::core::audit::SyncAuditLog;
use crate::core::sync::SyncStatus;
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Number of sync runs to show
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Skip the table statistics
    #[arg(long)]
    pub runs_only: bool,
}

fn format_range(stats: &TableStats) -> String {
    match (stats.oldest_record, stats.newest_record) {
        (Some(oldest), Some(newest)) => format!(
            "{} .. {}",
            oldest.format("%Y-%m-%d %H:%M"),
            newest.format("%Y-%m-%d %H:%M")
        ),
        _ => "-".to_string(),
    }
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        println!("📊 Sync Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match open_store(&config).await {
            Ok(store) => store,
            Err(e) => {
                println!("❌ Failed to connect to database");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let audit = SyncAuditLog::new(Arc::clone(&store));
        let records = match audit.recent(self.limit).await {
            Ok(records) => records,
            Err(e) => {
                println!("❌ Failed to load sync history");
                println!("   Error: {e}");
                store.close().await;
                return Ok(exit_code_for(&e));
            }
        };

        if records.is_empty() {
            println!("No sync history found.");
            println!("Run 'courtsync sync' to start syncing data.");
        } else {
            println!(
                "{:<20} {:<24} {:<12} {:>9} {:>8} {:>8} {:>7}",
                "Started", "Table", "Status", "Processed", "Created", "Updated", "Errors"
            );
            println!("{}", "-".repeat(94));
            for record in &records {
                let status = match record.status {
                    SyncStatus::Success => "✅ SUCCESS",
                    SyncStatus::Partial => "⚠️  PARTIAL",
                    SyncStatus::Failed => "❌ FAILED",
                    SyncStatus::Running => "🔄 RUNNING",
                    SyncStatus::Pending => "⏸️  PENDING",
                };
                println!(
                    "{:<20} {:<24} {:<12} {:>9} {:>8} {:>8} {:>7}",
                    record.sync_timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.table_name,
                    status,
                    record.records_processed,
                    record.records_created,
                    record.records_updated,
                    record.records_errors
                );
            }
        }

        if !self.runs_only {
            println!();
            println!("{:<28} {:>10}   {}", "Table", "Rows", "created_at range");
            println!("{}", "-".repeat(80));
            let engine = ArchivalEngine::new(Arc::clone(&store), config.archive.selected_tables());
            for status in engine.get_archival_status().await {
                for stats in [&status.live, &status.archive] {
                    println!(
                        "{:<28} {:>10}   {}",
                        stats.table,
                        stats.total_records,
                        format_range(stats)
                    );
                }
            }
        }

        store.close().await;
        Ok(EXIT_OK)
    }
}
