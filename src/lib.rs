//! filesort - sort a directory's files into category folders
//!
//! This library classifies files by extension into a fixed set of categories
//! (Images, Documents, Shortcuts, Icons, Arts, Videos, Codes, Others) and moves
//! every file directly inside a root directory into the matching folder,
//! optionally nested under a `<Month> <Year>` folder taken from the file's
//! modification time. Progress is reported to a pluggable sink.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod output;
pub mod sink;

pub use config::{CompiledFilters, ConfigError, SortConfig};
pub use file_category::{Category, FileMapper, category_of};
pub use file_organizer::{FileOrganizer, MoveOutcome, SortError, SortReport, SortRequest};
pub use sink::{ChannelSink, CollectingSink, OutcomeSink, SortEvent};

pub use cli::{Args, run_cli};
