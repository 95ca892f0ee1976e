//! Command-line front end.
//!
//! Parses arguments, loads configuration, and runs one sort with a console
//! or JSON sink attached. The core sort only ever sees an explicit
//! [`SortRequest`]; nothing here is global.

use crate::config::SortConfig;
use crate::file_organizer::{FileOrganizer, SortPlan, SortRequest};
use crate::output::{ConsoleSink, JsonSink, OutputFormatter};
use crate::sink::OutcomeSink;
use clap::{Parser, ValueEnum, ValueHint};
use std::path::PathBuf;
use std::process::ExitCode;

/// Output style for status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Sort the files of a directory into category folders.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Directory whose files are sorted (not recursive).
    #[arg(value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub directory: PathBuf,

    /// Nest files in "<Month> <Year>" folders by last-modified date.
    #[arg(short = 'd', long)]
    pub date_folders: bool,

    /// Show where files would go without moving anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Configuration file (default: ./.filesortrc.toml, then ~/.config/filesort/config.toml).
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Status line format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Hide the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Increase diagnostic logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Runs one sort described by `args`.
///
/// Returns success when the run completed, even if some files failed to
/// move. An invalid directory or configuration is a failure.
pub fn run_cli(args: &Args) -> ExitCode {
    let config_path = SortConfig::locate(args.config.as_deref());
    let loaded = match &config_path {
        Some(path) => SortConfig::load_from_file(path),
        None => Ok(SortConfig::default()),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::error(&format!("Error loading configuration: {}", e));
            return ExitCode::FAILURE;
        }
    };
    let filters = match config.compile_filters() {
        Ok(filters) => filters,
        Err(e) => {
            OutputFormatter::error(&format!("Error compiling filters: {}", e));
            return ExitCode::FAILURE;
        }
    };
    let filters = (!filters.is_pass_through()).then_some(filters);
    let mapper = config.mapper();
    let request = SortRequest::new(&args.directory, args.date_folders);

    let mut plan = match FileOrganizer::plan(&request, &mapper, filters.as_ref()) {
        Ok(plan) => plan,
        Err(e) => {
            make_sink(args.format, None).on_fatal(&e);
            return ExitCode::FAILURE;
        }
    };
    // The active configuration file stays where it is.
    if let Some(path) = &config_path {
        plan.exclude_path(path);
    }

    if args.dry_run {
        match args.format {
            OutputFormat::Json => match serde_json::to_string_pretty(&plan_summary(&plan)) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    OutputFormatter::error(&format!("Error serializing plan: {}", e));
                    return ExitCode::FAILURE;
                }
            },
            OutputFormat::Text => {
                OutputFormatter::dry_run_notice(&format!(
                    "Analyzing contents of: {}",
                    request.root().display()
                ));
                OutputFormatter::print_plan(&plan);
                OutputFormatter::info("Dry run complete. No files were modified.");
            }
        }
        return ExitCode::SUCCESS;
    }

    if args.format == OutputFormat::Text {
        OutputFormatter::info(&format!("Sorting contents of: {}", request.root().display()));
    }
    let progress = (!args.no_progress && !plan.is_empty()).then_some(plan.len() as u64);
    let mut sink = make_sink(args.format, progress);

    FileOrganizer::execute(&plan, sink.as_mut());
    ExitCode::SUCCESS
}

fn make_sink(format: OutputFormat, progress: Option<u64>) -> Box<dyn OutcomeSink> {
    match format {
        OutputFormat::Json => Box::new(JsonSink::new(std::io::stdout())),
        OutputFormat::Text => match progress {
            Some(total) => Box::new(ConsoleSink::new().with_progress(total)),
            None => Box::new(ConsoleSink::new()),
        },
    }
}

/// JSON view of a dry run.
fn plan_summary(plan: &SortPlan) -> serde_json::Value {
    serde_json::json!({
        "dry_run": true,
        "moves": plan.moves.iter().map(|planned| {
            serde_json::json!({
                "file_name": planned.file_name,
                "category": planned.category,
                "month_folder": planned.month_folder,
                "destination": planned.destination().to_string_lossy(),
                "error": planned.error,
            })
        }).collect::<Vec<_>>(),
        "skipped": plan.skipped.iter().map(|p| p.to_string_lossy().to_string()).collect::<Vec<_>>(),
        "by_category": plan.category_counts(),
    })
}
