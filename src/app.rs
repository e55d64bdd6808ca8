//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - builds the price source and the cached dashboard
//! - dispatches to the text report, the TUI or the exporter

use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::cache::CachePolicy;
use crate::cli::{Command, DashArgs, ExportArgs, ShowArgs};
use crate::data::{PriceSource, SyntheticSource, YahooSource};
use crate::domain::DashboardConfig;
use crate::error::AppError;
use crate::logging::LogTarget;
use crate::present::render_pass;
use crate::report::TextReport;

pub mod pipeline;

use pipeline::Dashboard;

/// Entry point for the `gld-dash` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `gld-dash` and `gld-dash -s SPY` to behave like `gld-dash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Tui(args) => handle_tui(args),
        Command::Export(args) => handle_export(args),
    }
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.dash);
    crate::logging::init(LogTarget::Stderr, config.log_file.as_deref())?;

    let dashboard = build_dashboard(&config)?;
    let view = dashboard.load(config.lookback, today());

    let mut report = TextReport::new(args.width, args.height);
    render_pass(&view, &mut report);
    print!("{}", report.into_string());
    Ok(())
}

fn handle_tui(args: DashArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args);
    crate::logging::init(LogTarget::Quiet, config.log_file.as_deref())?;

    let dashboard = build_dashboard(&config)?;
    crate::tui::run(dashboard, config)
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.dash);
    crate::logging::init(LogTarget::Stderr, config.log_file.as_deref())?;

    let dashboard = build_dashboard(&config)?;
    let view = dashboard.load(config.lookback, today());

    if let Some(err) = view.fetch_error {
        return Err(AppError::new(
            4,
            format!("Error fetching data for {}: {err}", view.symbol),
        ));
    }
    if view.series.is_empty() {
        return Err(AppError::new(4, format!("No rows returned for {}.", view.symbol)));
    }

    crate::io::write_series_csv(&args.out, &view.series)?;
    println!("Wrote {} rows to {}", view.series.len(), args.out.display());
    Ok(())
}

pub fn dashboard_config_from_args(args: &DashArgs) -> DashboardConfig {
    DashboardConfig {
        symbol: args.symbol.clone(),
        lookback: args.days,
        tail_rows: args.tail,
        timeout: Duration::from_secs(args.timeout_secs),
        failure_ttl: match args.failure_ttl_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        },
        demo: args.demo,
        seed: args.seed,
        log_file: args.log_file.clone(),
    }
}

/// Build the source selected by `config` and wrap it in a cached dashboard.
pub fn build_dashboard(config: &DashboardConfig) -> Result<Dashboard, AppError> {
    let source: Box<dyn PriceSource> = if config.demo {
        Box::new(SyntheticSource::new(config.seed))
    } else {
        Box::new(YahooSource::new(config.timeout)?)
    };

    let policy = match config.failure_ttl {
        Some(ttl) => CachePolicy::retry_failures_after(ttl),
        None => CachePolicy::session(),
    };

    let dashboard = Dashboard::new(source, config.symbol.clone(), policy, config.tail_rows);
    tracing::debug!(
        source = dashboard.source_name(),
        symbol = %config.symbol,
        policy = ?dashboard.cache().policy(),
        "dashboard ready"
    );
    Ok(dashboard)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Rewrite argv so `gld-dash` defaults to `gld-dash tui`.
///
/// Rules:
/// - `gld-dash`                      -> `gld-dash tui`
/// - `gld-dash -s SPY ...`           -> `gld-dash tui -s SPY ...`
/// - `gld-dash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "tui" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
