//! Diagnostic logging setup.
//!
//! Status lines for the user go through sinks; this module only wires
//! `tracing` events (planning details, failures) to stderr. `RUST_LOG`
//! overrides the level picked from the command line.

use chrono::Local;
use std::fmt as stdfmt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Local wall-clock timestamps (HH:MM:SS).
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%H:%M:%S"))
    }
}

/// Maps `-v`/`-q` counts to a level. Warnings are shown by default.
pub fn level_from_verbosity(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(LocalTime)
        .with_target(false)
        .compact()
        .try_init();

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
