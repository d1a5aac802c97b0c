//! Sync command implementation
//!
//! Runs one entity sync, the configured `sync all` sequence, or the daily
//! pipeline, and prints the resulting counts.

use super::{exit_code_for, exit_code_for_kind, open_store, EXIT_CONFIG, EXIT_OK, EXIT_PARTIAL};
use crate::adapters::provider::RateLimitedApiClient;
use crate::config::load_config;
use crate::core::sync::{EntityOutcome, SyncOrchestrator, SyncRecord, SyncReport, SyncStatus};
use chrono::{NaiveDate, Utc};
use clap::{Args, ValueEnum};
use std::sync::Arc;

/// What to sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyncTarget {
    /// The configured entity sequence
    All,
    /// Games, game logs, injuries and DFS for today
    Today,
    Players,
    Games,
    GameLogs,
    Injuries,
    DfsProjections,
    DailyDfs,
    /// Lineups of one game (requires --game-id)
    Lineup,
}

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Entity to sync
    #[arg(value_enum, default_value = "all")]
    pub target: SyncTarget,

    /// Date for dated endpoints (YYYY-MM-DD, default today in UTC)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Last day of a games range, inclusive (games only)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Game id for lineup syncs
    #[arg(long)]
    pub game_id: Option<i64>,

    /// Write to the in-memory backend instead of the configured database
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(target_entity = ?self.target, "Starting sync command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - rows are written to memory only");
            println!();
        }

        if self.end_date.is_some() && self.target != SyncTarget::Games {
            println!("❌ --end-date is only supported for games");
            return Ok(EXIT_CONFIG);
        }

        let store = match open_store(&config).await {
            Ok(store) => store,
            Err(e) => {
                println!("❌ Failed to open storage");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        let client = Arc::new(RateLimitedApiClient::new(&config.provider)?);
        let orchestrator = SyncOrchestrator::new(client, Arc::clone(&store), config.sync.clone());
        let date = self.date.unwrap_or_else(|| Utc::now().date_naive());

        println!("🚀 Syncing {:?} for {date}", self.target);
        println!();

        let code = self.run(&orchestrator, date).await;

        store.close().await;
        Ok(code)
    }

    /// Runs the selected target for `date` and maps the outcome to an exit code
    async fn run(&self, orchestrator: &SyncOrchestrator, date: NaiveDate) -> i32 {
        match self.target {
            SyncTarget::All => report_exit_code(&orchestrator.sync_all(date).await),
            SyncTarget::Today => {
                let result = match self.date {
                    Some(date) => orchestrator.sync_day(date).await,
                    None => orchestrator.sync_today().await,
                };
                match result {
                    Ok(report) => report_exit_code(&report),
                    Err(e) => failure_exit_code(&e),
                }
            }
            SyncTarget::Games => match self.end_date {
                Some(end) => match orchestrator.sync_games_range(date, end).await {
                    Ok(report) => report_exit_code(&report),
                    Err(e) => failure_exit_code(&e),
                },
                None => record_exit_code(orchestrator.sync_games(date).await),
            },
            SyncTarget::Players => record_exit_code(orchestrator.sync_players().await),
            SyncTarget::GameLogs => record_exit_code(orchestrator.sync_game_logs(date).await),
            SyncTarget::Injuries => record_exit_code(orchestrator.sync_injuries().await),
            SyncTarget::DfsProjections => {
                record_exit_code(orchestrator.sync_dfs_projections(date).await)
            }
            SyncTarget::DailyDfs => record_exit_code(orchestrator.sync_daily_dfs(date).await),
            SyncTarget::Lineup => match self.game_id {
                Some(game_id) => record_exit_code(orchestrator.sync_lineup(game_id).await),
                None => {
                    println!("❌ --game-id is required for lineup syncs");
                    EXIT_CONFIG
                }
            },
        }
    }
}

fn print_record(record: &SyncRecord) {
    let icon = match record.status {
        SyncStatus::Success => "✅",
        SyncStatus::Partial => "⚠️ ",
        _ => "❌",
    };
    println!(
        "  {icon} {:<18} processed {:>5}  created {:>5}  updated {:>5}  errors {:>5}  ({} ms)",
        record.table_name,
        record.records_processed,
        record.records_created,
        record.records_updated,
        record.records_errors,
        record.duration_ms
    );
    if let Some(message) = &record.error_message {
        println!("     {message}");
    }
}

fn status_exit_code(status: SyncStatus) -> i32 {
    match status {
        SyncStatus::Success => EXIT_OK,
        _ => EXIT_PARTIAL,
    }
}

fn record_exit_code(result: crate::domain::Result<SyncRecord>) -> i32 {
    match result {
        Ok(record) => {
            print_record(&record);
            status_exit_code(record.status)
        }
        Err(e) => failure_exit_code(&e),
    }
}

fn failure_exit_code(error: &crate::domain::SyncError) -> i32 {
    println!("❌ Sync failed: {error}");
    exit_code_for(error)
}

fn report_exit_code(report: &SyncReport) -> i32 {
    println!("📊 Sync Summary:");
    for outcome in &report.outcomes {
        match outcome {
            EntityOutcome::Completed(record) => print_record(record),
            EntityOutcome::Failed { table, message, .. } => {
                println!("  ❌ {table:<18} {message}");
            }
        }
    }
    println!();
    println!(
        "  Created: {}  Updated: {}  Errors: {}  Duration: {:.2}s",
        report.total_created(),
        report.total_updated(),
        report.total_errors(),
        report.duration.as_secs_f64()
    );

    match (report.status(), report.first_failure_kind()) {
        (SyncStatus::Success, _) => EXIT_OK,
        (SyncStatus::Failed, Some(kind)) => exit_code_for_kind(kind),
        _ => EXIT_PARTIAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::config::{secret_string, ProviderConfig, RetryConfig, SyncConfig};
    use crate::core::sync::RunCounts;
    use crate::domain::SyncError;
    use mockito::Matcher;
    use std::time::Duration;
    use uuid::Uuid;

    fn orchestrator(base_url: &str) -> SyncOrchestrator {
        let provider = ProviderConfig {
            base_url: base_url.to_string(),
            api_key: secret_string("key".to_string()),
            password: secret_string("MYSPORTSFEEDS".to_string()),
            season: "2023-2024-regular".to_string(),
            request_delay_ms: 0,
            timeout_seconds: 5,
            page_size: 500,
            inter_page_delay_ms: 0,
            retry: RetryConfig {
                max_retry_attempts: 1,
                base_delay_ms: 1,
                retry_client_errors: false,
            },
        };
        let client = Arc::new(RateLimitedApiClient::new(&provider).unwrap());
        SyncOrchestrator::new(client, Arc::new(InMemoryStore::new()), SyncConfig::default())
    }

    #[tokio::test]
    async fn test_today_honors_explicit_date() {
        let mut server = mockito::Server::new_async().await;
        let games = server
            .mock("GET", "/2023-2024-regular/date/20240201/games.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"games": []}"#)
            .expect(1)
            .create_async()
            .await;
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let args = SyncArgs {
            target: SyncTarget::Today,
            date: Some(date),
            end_date: None,
            game_id: None,
            dry_run: true,
        };

        args.run(&orchestrator(&server.url()), date).await;

        games.assert_async().await;
    }

    #[test]
    fn test_report_exit_codes() {
        let mut record = SyncRecord::new("players");
        record.mark_running();
        record.finish(
            RunCounts {
                processed: 2,
                created: 2,
                updated: 0,
                errors: 0,
            },
            Duration::from_millis(3),
        );

        let mut ok = SyncReport::new(Uuid::new_v4());
        ok.push(EntityOutcome::Completed(record.clone()));
        assert_eq!(report_exit_code(&ok), EXIT_OK);

        let mut failed = SyncReport::new(Uuid::new_v4());
        failed.push(EntityOutcome::failed(
            "games",
            &SyncError::Connectivity("refused".to_string()),
        ));
        assert_eq!(report_exit_code(&failed), super::super::EXIT_CONNECTION);

        failed.push(EntityOutcome::Completed(record));
        assert_eq!(report_exit_code(&failed), EXIT_PARTIAL);
    }
}
