//! Console and JSON presentation of sort events.
//!
//! [`OutputFormatter`] holds the styled print helpers. [`ConsoleSink`] and
//! [`JsonSink`] are the two [`OutcomeSink`]s the command-line front end
//! attaches to a run.

use crate::file_organizer::{MoveOutcome, SortError, SortPlan, SortReport};
use crate::sink::{OutcomeSink, SortEvent};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::io::Write;

/// Styled console output helpers.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints an `[INFO]` line.
    pub fn info(message: &str) {
        println!("{} {}", "[INFO]".cyan(), message);
    }

    /// Prints an `[ERROR]` line to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "[ERROR]".red(), message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for `total` file moves.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a table of file counts per category.
    ///
    /// ```no_run
    /// use filesort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table("SUMMARY", &counts);
    /// ```
    pub fn summary_table(title: &str, category_counts: &BTreeMap<String, usize>) {
        Self::header(title);

        let width = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8);
        let total: usize = category_counts.values().sum();

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));
        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural_files(*count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural_files(total),
            width = width
        );
    }

    /// Prints what a run would do without doing it.
    pub fn print_plan(plan: &SortPlan) {
        if plan.is_empty() {
            Self::dry_run_notice("No files found to sort.");
            return;
        }
        for planned in &plan.moves {
            match &planned.error {
                Some(error) => Self::dry_run_notice(&format!(
                    "Would fail {}: {}",
                    planned.file_name, error
                )),
                None => Self::dry_run_notice(&format!(
                    "Would move: {} → {}/",
                    planned.file_name,
                    planned.target_label()
                )),
            }
        }
        for skipped in &plan.skipped {
            Self::dry_run_notice(&format!("Would skip: {}", skipped.display()));
        }
        Self::summary_table("DRY RUN SUMMARY", &plan.category_counts());
    }
}

fn plural_files(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Prints status lines to the console, optionally behind a progress bar.
pub struct ConsoleSink {
    progress: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { progress: None }
    }

    /// Shows a progress bar sized for `total` moves.
    pub fn with_progress(mut self, total: u64) -> Self {
        self.progress = Some(OutputFormatter::create_progress_bar(total));
        self
    }

    fn line(&self, message: String, is_error: bool) {
        let styled = if is_error {
            format!("{} {}", "[ERROR]".red(), message)
        } else {
            format!("{} {}", "[INFO]".cyan(), message)
        };
        match &self.progress {
            Some(pb) => pb.println(styled),
            None if is_error => eprintln!("{}", styled),
            None => println!("{}", styled),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeSink for ConsoleSink {
    fn on_outcome(&mut self, outcome: &MoveOutcome) {
        self.line(outcome.status_line(), !outcome.success);
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    fn on_fatal(&mut self, error: &SortError) {
        self.line(error.to_string(), true);
    }

    fn on_complete(&mut self, report: &SortReport) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
        self.line("Sorting complete.".to_string(), false);
        if report.failed > 0 {
            self.line(
                format!("{} file(s) could not be moved.", report.failed),
                true,
            );
        }
        if report.skipped > 0 {
            self.line(
                format!("{} file(s) left in place by filters.", report.skipped),
                false,
            );
        }
        if report.moved > 0 {
            OutputFormatter::summary_table("SUMMARY", &report.by_category);
        }
    }
}

/// Writes one JSON object per event, one per line.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, event: &SortEvent) {
        let written = serde_json::to_writer(&mut self.writer, event)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.writer));
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write event");
        }
    }
}

impl<W: Write> OutcomeSink for JsonSink<W> {
    fn on_outcome(&mut self, outcome: &MoveOutcome) {
        self.emit(&SortEvent::Outcome(outcome.clone()));
    }

    fn on_fatal(&mut self, error: &SortError) {
        self.emit(&SortEvent::Fatal {
            message: error.to_string(),
        });
    }

    fn on_complete(&mut self, report: &SortReport) {
        self.emit(&SortEvent::Complete(report.clone()));
    }
}
