//! Receivers for sort events.
//!
//! The organizer never prints. It hands every [`MoveOutcome`] to an
//! [`OutcomeSink`], and the caller decides where the events go: a console,
//! a JSON stream, an in-memory list, or a channel drained by another thread
//! that owns a display.

use crate::file_organizer::{MoveOutcome, SortError, SortReport};
use serde::Serialize;
use std::sync::mpsc::Sender;

/// Observer of a sorting run.
pub trait OutcomeSink {
    /// Called once per planned file, in processing order.
    fn on_outcome(&mut self, outcome: &MoveOutcome);

    /// Called when the run aborts before touching any file.
    fn on_fatal(&mut self, _error: &SortError) {}

    /// Called after the last outcome of a completed run.
    fn on_complete(&mut self, _report: &SortReport) {}
}

/// An owned sort event, suitable for sending across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SortEvent {
    Outcome(MoveOutcome),
    Fatal { message: String },
    Complete(SortReport),
}

impl SortEvent {
    /// The log line a display should show for this event.
    pub fn status_line(&self) -> String {
        match self {
            SortEvent::Outcome(outcome) => outcome.status_line(),
            SortEvent::Fatal { message } => message.clone(),
            SortEvent::Complete(_) => "Sorting complete.".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        match self {
            SortEvent::Outcome(outcome) => !outcome.success,
            SortEvent::Fatal { .. } => true,
            SortEvent::Complete(_) => false,
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<SortEvent>,
}

impl CollectingSink {
    pub fn outcomes(&self) -> impl Iterator<Item = &MoveOutcome> {
        self.events.iter().filter_map(|event| match event {
            SortEvent::Outcome(outcome) => Some(outcome),
            _ => None,
        })
    }

    pub fn fatal_errors(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            SortEvent::Fatal { message } => Some(message.as_str()),
            _ => None,
        })
    }

    pub fn status_lines(&self) -> Vec<String> {
        self.events.iter().map(SortEvent::status_line).collect()
    }
}

impl OutcomeSink for CollectingSink {
    fn on_outcome(&mut self, outcome: &MoveOutcome) {
        self.events.push(SortEvent::Outcome(outcome.clone()));
    }

    fn on_fatal(&mut self, error: &SortError) {
        self.events.push(SortEvent::Fatal {
            message: error.to_string(),
        });
    }

    fn on_complete(&mut self, report: &SortReport) {
        self.events.push(SortEvent::Complete(report.clone()));
    }
}

/// Forwards events over an mpsc channel.
///
/// Run the sort on a worker thread with this sink and drain the receiver on
/// the thread that owns the display. A dropped receiver does not stop the
/// sort; later events are discarded.
///
/// ```
/// use filesort::file_organizer::{FileOrganizer, SortRequest};
/// use filesort::sink::{ChannelSink, SortEvent};
/// use std::sync::mpsc;
/// use std::thread;
///
/// let (tx, rx) = mpsc::channel();
/// let worker = thread::spawn(move || {
///     let mut sink = ChannelSink::new(tx);
///     let _ = FileOrganizer::sort_all(&SortRequest::new("/does/not/exist", false), &mut sink);
/// });
/// let events: Vec<SortEvent> = rx.iter().collect();
/// worker.join().unwrap();
/// assert!(matches!(events.as_slice(), [SortEvent::Fatal { .. }]));
/// ```
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<SortEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<SortEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: SortEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("event receiver dropped");
        }
    }
}

impl OutcomeSink for ChannelSink {
    fn on_outcome(&mut self, outcome: &MoveOutcome) {
        self.send(SortEvent::Outcome(outcome.clone()));
    }

    fn on_fatal(&mut self, error: &SortError) {
        self.send(SortEvent::Fatal {
            message: error.to_string(),
        });
    }

    fn on_complete(&mut self, report: &SortReport) {
        self.send(SortEvent::Complete(report.clone()));
    }
}
