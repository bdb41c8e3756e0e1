//! CLI surface: intentionally thin, a single entry point with no
//! subcommands.

use clap::Parser;
use std::path::PathBuf;

/// Intra-day batch scheduler and process supervisor for mirror sync jobs.
#[derive(Parser)]
#[command(name = "sync-scheduler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the pre-validated catalogue JSON file.
    #[arg(long, default_value = "configs/mirrors.json")]
    pub catalogue: PathBuf,

    /// Force dry-run mode regardless of `DRY_RUN`.
    #[arg(long)]
    pub dry_run: bool,

    /// Override `MANUAL_SYNC_PORT`.
    #[arg(long)]
    pub manual_sync_port: Option<u16>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    pub verbose: bool,
}
