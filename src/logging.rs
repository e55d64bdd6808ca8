//! Tracing subscriber setup.
//!
//! The filter comes from `RUST_LOG` (default `gld_dash=info`). Line-oriented
//! commands log to stderr; the TUI owns the terminal, so it logs to a file
//! when one is given and discards events otherwise.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::AppError;

const DEFAULT_FILTER: &str = "gld_dash=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Terminal is in use by the UI.
    Quiet,
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(target: LogTarget, log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (writer, ansi) = match (log_file, target) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        (None, LogTarget::Stderr) => (BoxMakeWriter::new(std::io::stderr), true),
        (None, LogTarget::Quiet) => (BoxMakeWriter::new(std::io::sink), false),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .try_init();

    Ok(())
}
