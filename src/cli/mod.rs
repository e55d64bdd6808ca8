//! Command-line parsing for the price dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetching/metrics code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_SYMBOL, LookbackDays, Symbol};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gld-dash", version, about = "Daily price dashboard for a single instrument")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the dashboard once as plain text.
    Show(ShowArgs),
    /// Launch the interactive TUI.
    Tui(DashArgs),
    /// Fetch the series and write it to CSV.
    Export(ExportArgs),
}

/// Options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct DashArgs {
    /// Ticker symbol to track.
    #[arg(short = 's', long, env = "GLD_DASH_SYMBOL", default_value = DEFAULT_SYMBOL)]
    pub symbol: Symbol,

    /// Lookback window in calendar days.
    #[arg(short = 'd', long, env = "GLD_DASH_DAYS", default_value = "365")]
    pub days: LookbackDays,

    /// Rows shown in the raw data table.
    #[arg(long, default_value_t = 10)]
    pub tail: usize,

    /// Provider call timeout (seconds).
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Retry a failed fetch after this many seconds (0 = keep the failure for the session).
    #[arg(long, default_value_t = 60)]
    pub failure_ttl_secs: u64,

    /// Use a seeded synthetic series instead of the network.
    #[arg(long)]
    pub demo: bool,

    /// Seed for `--demo`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Append log output to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Options for the plain-text report.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub dash: DashArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for CSV export.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub dash: DashArgs,

    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,
}
