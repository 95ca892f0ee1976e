/// Sorting files of a root directory into category folders.
///
/// A run has two phases. [`FileOrganizer::plan`] validates the root, lists its
/// immediate entries once and resolves a destination for every file.
/// [`FileOrganizer::execute`] then moves each file, reporting a
/// [`MoveOutcome`] per file to an [`OutcomeSink`]. A failed file never stops
/// the run; only an invalid root or an unreadable listing is fatal.
use crate::config::CompiledFilters;
use crate::file_category::{Category, FileMapper};
use crate::sink::OutcomeSink;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

/// What to sort and how. Built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRequest {
    root: PathBuf,
    use_date_folders: bool,
}

impl SortRequest {
    pub fn new(root: impl Into<PathBuf>, use_date_folders: bool) -> Self {
        Self {
            root: root.into(),
            use_date_folders,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether files are nested under a `<Month> <Year>` folder inside their category.
    pub fn use_date_folders(&self) -> bool {
        self.use_date_folders
    }
}

/// A resolved destination for one file, computed before anything is moved.
#[derive(Debug, Clone)]
pub struct PlannedMove {
    /// Full path of the file in the root.
    pub source: PathBuf,
    /// File name exactly as listed, used to build the destination.
    pub name: OsString,
    /// Lossy UTF-8 rendering of `name` for status lines.
    pub file_name: String,
    pub category: Category,
    /// Month folder label, only in date mode.
    pub month_folder: Option<String>,
    /// Directory the file is moved into.
    pub destination_dir: PathBuf,
    /// Set when the entry or its month folder could not be resolved; the move is reported failed.
    pub error: Option<String>,
}

impl PlannedMove {
    pub fn destination(&self) -> PathBuf {
        self.destination_dir.join(&self.name)
    }

    /// A failed move for a listing entry that could not be read.
    fn unreadable(root: &Path, source: io::Error) -> Self {
        let error = SortError::ReadEntry {
            path: root.to_path_buf(),
            source,
        };
        Self {
            source: root.to_path_buf(),
            name: OsString::new(),
            file_name: "<unreadable entry>".to_string(),
            category: Category::Others,
            month_folder: None,
            destination_dir: root.join(Category::Others.dir_name()),
            error: Some(error.to_string()),
        }
    }

    /// Relative folder label, e.g. `Images` or `Images/June 2023`.
    pub fn target_label(&self) -> String {
        match &self.month_folder {
            Some(month) => format!("{}/{}", self.category.dir_name(), month),
            None => self.category.dir_name().to_string(),
        }
    }
}

/// The result of sorting a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub file_name: String,
    pub category: Category,
    pub month_folder: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

impl MoveOutcome {
    fn moved(plan: &PlannedMove) -> Self {
        Self {
            file_name: plan.file_name.clone(),
            category: plan.category,
            month_folder: plan.month_folder.clone(),
            success: true,
            error: None,
        }
    }

    fn failed(plan: &PlannedMove, detail: String) -> Self {
        Self {
            file_name: plan.file_name.clone(),
            category: plan.category,
            month_folder: plan.month_folder.clone(),
            success: false,
            error: Some(detail),
        }
    }

    /// Human-readable status line for this outcome.
    ///
    /// ```
    /// use filesort::file_category::Category;
    /// use filesort::file_organizer::MoveOutcome;
    ///
    /// let outcome = MoveOutcome {
    ///     file_name: "a.png".to_string(),
    ///     category: Category::Images,
    ///     month_folder: Some("June 2023".to_string()),
    ///     success: true,
    ///     error: None,
    /// };
    /// assert_eq!(outcome.status_line(), "Moved: a.png → June 2023/Images");
    /// ```
    pub fn status_line(&self) -> String {
        if !self.success {
            return format!(
                "Failed to move {}: {}",
                self.file_name,
                self.error.as_deref().unwrap_or("unknown error")
            );
        }
        match &self.month_folder {
            Some(month) => format!("Moved: {} → {}/{}", self.file_name, month, self.category),
            None => format!("Moved: {} → {}", self.file_name, self.category),
        }
    }
}

/// Totals for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortReport {
    pub moved: usize,
    pub failed: usize,
    /// Files left in place by entry filters.
    pub skipped: usize,
    /// Successfully moved files per category folder name.
    pub by_category: BTreeMap<String, usize>,
}

impl SortReport {
    fn record(&mut self, outcome: &MoveOutcome) {
        if outcome.success {
            self.moved += 1;
            *self
                .by_category
                .entry(outcome.category.dir_name().to_string())
                .or_insert(0) += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.moved + self.failed
    }
}

/// A full plan for one run.
#[derive(Debug, Clone, Default)]
pub struct SortPlan {
    pub moves: Vec<PlannedMove>,
    /// Files excluded by entry filters.
    pub skipped: Vec<PathBuf>,
}

impl SortPlan {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Leaves `path` in place, counting it as skipped.
    ///
    /// Paths are compared after canonicalization. Returns true if a planned
    /// move was removed.
    pub fn exclude_path(&mut self, path: &Path) -> bool {
        let Ok(target) = fs::canonicalize(path) else {
            return false;
        };
        let Some(index) = self.moves.iter().position(|planned| {
            planned.error.is_none()
                && fs::canonicalize(&planned.source).is_ok_and(|source| source == target)
        }) else {
            return false;
        };
        let removed = self.moves.remove(index);
        debug!(path = %removed.source.display(), "excluded from plan");
        self.skipped.push(removed.source);
        true
    }

    /// Planned moves per category folder name.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for planned in &self.moves {
            *counts
                .entry(planned.category.dir_name().to_string())
                .or_insert(0) += 1;
        }
        counts
    }
}

/// Errors raised while sorting.
#[derive(Debug)]
pub enum SortError {
    /// The root directory does not exist.
    InvalidRoot { path: PathBuf },
    /// The root exists but is not a directory.
    NotADirectory { path: PathBuf },
    /// The root listing could not be read.
    ReadDir { path: PathBuf, source: io::Error },
    /// A single entry of the root listing could not be read.
    ReadEntry { path: PathBuf, source: io::Error },
    /// A destination folder could not be created.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// A file could not be moved.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// A file's modification time could not be read.
    Metadata { path: PathBuf, source: io::Error },
}

impl SortError {
    /// True for errors that abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidRoot { .. } | Self::NotADirectory { .. } | Self::ReadDir { .. }
        )
    }
}

impl std::fmt::Display for SortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRoot { path } => {
                write!(f, "Source folder does not exist: {}", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Source path is not a directory: {}", path.display())
            }
            Self::ReadDir { path, source } => {
                write!(f, "Error reading directory {}: {}", path.display(), source)
            }
            Self::ReadEntry { path, source } => {
                write!(
                    f,
                    "Error reading directory entry in {}: {}",
                    path.display(),
                    source
                )
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::Metadata { path, source } => {
                write!(
                    f,
                    "Failed to read modification time of {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for SortError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRoot { .. } | Self::NotADirectory { .. } => None,
            Self::ReadDir { source, .. }
            | Self::ReadEntry { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::Metadata { source, .. } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
        }
    }
}

pub type SortResult<T> = Result<T, SortError>;

/// Formats a timestamp as a month folder label in local time, e.g. `June 2023`.
pub fn month_folder_for(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%B %Y").to_string()
}

/// Runs the plan/execute pipeline.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Sorts `request.root` with the built-in categories and no filters.
    ///
    /// On an invalid root the sink receives one fatal event and nothing is
    /// touched.
    ///
    /// ```no_run
    /// use filesort::file_organizer::{FileOrganizer, SortRequest};
    /// use filesort::sink::CollectingSink;
    ///
    /// let mut sink = CollectingSink::default();
    /// let report = FileOrganizer::sort_all(&SortRequest::new("/home/me/Downloads", false), &mut sink);
    /// match report {
    ///     Ok(report) => println!("{} moved, {} failed", report.moved, report.failed),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn sort_all(request: &SortRequest, sink: &mut dyn OutcomeSink) -> SortResult<SortReport> {
        Self::sort_all_with(request, &FileMapper::default(), None, sink)
    }

    /// Sorts with an explicit mapper and optional entry filters.
    pub fn sort_all_with(
        request: &SortRequest,
        mapper: &FileMapper,
        filters: Option<&CompiledFilters>,
        sink: &mut dyn OutcomeSink,
    ) -> SortResult<SortReport> {
        let plan = match Self::plan(request, mapper, filters) {
            Ok(plan) => plan,
            Err(e) => {
                sink.on_fatal(&e);
                return Err(e);
            }
        };
        Ok(Self::execute(&plan, sink))
    }

    /// Resolves a destination for every file directly inside the root.
    ///
    /// Directories are skipped. Nothing on disk is modified.
    pub fn plan(
        request: &SortRequest,
        mapper: &FileMapper,
        filters: Option<&CompiledFilters>,
    ) -> SortResult<SortPlan> {
        let root = request.root();
        Self::validate_root(root)?;

        info!(root = %root.display(), date_folders = request.use_date_folders(), "planning sort");

        // Snapshot the listing so folders created during the run are never revisited.
        let entries: Vec<_> = fs::read_dir(root)
            .map_err(|e| {
                error!(root = %root.display(), error = %e, "cannot list root");
                SortError::ReadDir {
                    path: root.to_path_buf(),
                    source: e,
                }
            })?
            .collect();

        let mut plan = SortPlan::default();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "unreadable directory entry");
                    plan.moves.push(PlannedMove::unreadable(root, e));
                    continue;
                }
            };
            let path = entry.path();

            // is_dir follows symlinks, so a link to a directory is skipped too.
            if path.is_dir() {
                debug!(path = %path.display(), "skipping directory");
                continue;
            }

            if let Some(filters) = filters
                && !filters.should_include(&path)
            {
                debug!(path = %path.display(), "excluded by filters");
                plan.skipped.push(path);
                continue;
            }

            let planned = Self::plan_entry(request, mapper, path);
            debug!(
                file = %planned.file_name,
                target = %planned.target_label(),
                "planned move"
            );
            plan.moves.push(planned);
        }

        Ok(plan)
    }

    /// Moves every planned file and reports each outcome.
    pub fn execute(plan: &SortPlan, sink: &mut dyn OutcomeSink) -> SortReport {
        let mut report = SortReport {
            skipped: plan.skipped.len(),
            ..SortReport::default()
        };

        for planned in &plan.moves {
            let outcome = match Self::move_planned(planned) {
                Ok(()) => MoveOutcome::moved(planned),
                Err(e) => {
                    warn!(file = %planned.file_name, error = %e, "move failed");
                    MoveOutcome::failed(planned, e)
                }
            };
            report.record(&outcome);
            sink.on_outcome(&outcome);
        }

        info!(
            moved = report.moved,
            failed = report.failed,
            skipped = report.skipped,
            "sorting complete"
        );
        sink.on_complete(&report);
        report
    }

    fn validate_root(root: &Path) -> SortResult<()> {
        if !root.exists() {
            error!(root = %root.display(), "source folder does not exist");
            return Err(SortError::InvalidRoot {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            error!(root = %root.display(), "source path is not a directory");
            return Err(SortError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        Ok(())
    }

    fn plan_entry(request: &SortRequest, mapper: &FileMapper, path: PathBuf) -> PlannedMove {
        let name = path.file_name().map(OsString::from).unwrap_or_default();
        let file_name = name.to_string_lossy().to_string();
        let category = mapper.categorize_path(&path);
        let category_dir = request.root().join(category.dir_name());

        if !request.use_date_folders() {
            return PlannedMove {
                source: path,
                name,
                file_name,
                category,
                month_folder: None,
                destination_dir: category_dir,
                error: None,
            };
        }

        match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(modified) => {
                let month = month_folder_for(modified);
                PlannedMove {
                    destination_dir: category_dir.join(&month),
                    source: path,
                    name,
                    file_name,
                    category,
                    month_folder: Some(month),
                    error: None,
                }
            }
            Err(e) => {
                let error = SortError::Metadata {
                    path: path.clone(),
                    source: e,
                };
                PlannedMove {
                    source: path,
                    name,
                    file_name,
                    category,
                    month_folder: None,
                    destination_dir: category_dir,
                    error: Some(error.to_string()),
                }
            }
        }
    }

    fn move_planned(planned: &PlannedMove) -> Result<(), String> {
        if let Some(error) = &planned.error {
            return Err(error.clone());
        }

        fs::create_dir_all(&planned.destination_dir).map_err(|e| {
            SortError::DirectoryCreationFailed {
                path: planned.destination_dir.clone(),
                source: e,
            }
            .to_string()
        })?;

        let destination = planned.destination();
        move_file(&planned.source, &destination).map_err(|e| {
            SortError::FileMoveFailure {
                source: planned.source.clone(),
                destination: destination.clone(),
                source_error: e,
            }
            .to_string()
        })
    }
}

/// Moves `source` to `destination`, replacing an existing file there.
///
/// Falls back to copy and remove when the two paths are on different devices.
pub fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(source = %source.display(), "rename crosses devices, copying");
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
        Err(e) => Err(e),
    }
}
