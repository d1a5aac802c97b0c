//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for courtsync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// courtsync - NBA stats ingest pipeline
#[derive(Parser, Debug)]
#[command(name = "courtsync")]
#[command(version, about, long_about = None)]
#[command(author = "Courtsync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "courtsync.toml", env = "COURTSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "COURTSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync provider data into storage
    Sync(commands::sync::SyncArgs),

    /// Copy one season's live rows into the archive tables
    Archive(commands::archive::ArchiveArgs),

    /// Show recent sync runs and archive table status
    Status(commands::status::StatusArgs),

    /// Check provider and storage connectivity
    Health(commands::health::HealthArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
