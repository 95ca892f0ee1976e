use chrono::{Local, TimeZone};
use filesort::config::SortConfig;
use filesort::file_category::Category;
use filesort::file_organizer::{FileOrganizer, SortError, SortRequest};
use filesort::sink::{ChannelSink, CollectingSink, SortEvent};
/// Integration tests for filesort
///
/// End-to-end runs against real temporary directories:
/// 1. Flat category sorting
/// 2. Month/year folders
/// 3. Invalid roots
/// 4. Idempotence, overwrite and directory handling
/// 5. Configured filters and extra extensions
/// 6. Channel delivery to another thread
use filetime::FileTime;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn create_text_file(&self, name: &str, content: &str) {
        let mut file = File::create(self.path().join(name)).expect("Failed to create file");
        file.write_all(content.as_bytes())
            .expect("Failed to write file content");
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_text_file(name, name);
        }
    }

    fn create_subdir(&self, name: &str) {
        fs::create_dir_all(self.path().join(name)).expect("Failed to create subdirectory");
    }

    /// Pins a file's modification time to noon local time on the given day.
    fn set_modified(&self, name: &str, year: i32, month: u32, day: u32) {
        let local = Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .expect("unambiguous local time");
        filetime::set_file_mtime(
            self.path().join(name),
            FileTime::from_unix_time(local.timestamp(), 0),
        )
        .expect("Failed to set mtime");
    }

    fn sort(&self, use_date_folders: bool) -> (filesort::SortReport, CollectingSink) {
        let mut sink = CollectingSink::default();
        let report =
            FileOrganizer::sort_all(&SortRequest::new(self.path(), use_date_folders), &mut sink)
                .expect("sort should succeed");
        (report, sink)
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Path should not exist: {}", path.display());
    }

    /// Files directly in the root (non-recursive).
    fn count_root_files(&self) -> usize {
        fs::read_dir(self.path())
            .expect("Failed to read directory")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .count()
    }

    fn list_files_recursive(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        Self::walk_dir(self.path(), &mut files);
        files.sort();
        files
    }

    fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) {
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    Self::walk_dir(&path, files);
                } else {
                    files.push(path);
                }
            }
        }
    }
}

// ============================================================================
// Test Suite 1: Flat sorting
// ============================================================================

#[test]
fn test_sort_empty_directory() {
    let fixture = TestFixture::new();

    let (report, sink) = fixture.sort(false);

    assert_eq!(report.total(), 0);
    assert!(fs::read_dir(fixture.path()).unwrap().next().is_none());
    assert_eq!(sink.status_lines(), vec!["Sorting complete.".to_string()]);
}

#[test]
fn test_sort_basic_scenario() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.png", "b.txt", "c.xyz"]);

    let (report, _) = fixture.sort(false);

    fixture.assert_file_exists("Images/a.png");
    fixture.assert_file_exists("Documents/b.txt");
    fixture.assert_file_exists("Others/c.xyz");
    fixture.assert_not_exists("a.png");
    fixture.assert_not_exists("b.txt");
    fixture.assert_not_exists("c.xyz");
    assert_eq!(report.moved, 3);
    assert_eq!(report.failed, 0);
}

#[test]
fn test_sort_every_category() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        "photo.jpeg",
        "paper.pdf",
        "link.lnk",
        "logo.svg",
        "sketch.sai",
        "movie.mkv",
        "main.rs",
        "mystery.bin",
    ]);

    let (report, _) = fixture.sort(false);

    fixture.assert_file_exists("Images/photo.jpeg");
    fixture.assert_file_exists("Documents/paper.pdf");
    fixture.assert_file_exists("Shortcuts/link.lnk");
    fixture.assert_file_exists("Icons/logo.svg");
    fixture.assert_file_exists("Arts/sketch.sai");
    fixture.assert_file_exists("Videos/movie.mkv");
    fixture.assert_file_exists("Codes/main.rs");
    fixture.assert_file_exists("Others/mystery.bin");
    assert_eq!(report.by_category.len(), 8);
    assert_eq!(fixture.count_root_files(), 0);
}

#[test]
fn test_sort_mixed_case_extensions() {
    let fixture = TestFixture::new();
    fixture.create_files(&["SHOT.PNG", "Notes.TxT"]);

    fixture.sort(false);

    fixture.assert_file_exists("Images/SHOT.PNG");
    fixture.assert_file_exists("Documents/Notes.TxT");
}

#[test]
fn test_files_without_extension_and_dotfiles_go_to_others() {
    let fixture = TestFixture::new();
    fixture.create_files(&["Makefile", ".bashrc", "archive.tar.gz"]);

    fixture.sort(false);

    fixture.assert_file_exists("Others/Makefile");
    fixture.assert_file_exists("Others/.bashrc");
    fixture.assert_file_exists("Others/archive.tar.gz");
}

#[test]
fn test_ts_files_are_videos() {
    let fixture = TestFixture::new();
    fixture.create_files(&["clip.ts"]);

    fixture.sort(false);

    fixture.assert_file_exists("Videos/clip.ts");
    fixture.assert_not_exists("Codes");
}

#[test]
fn test_sort_preserves_file_content() {
    let fixture = TestFixture::new();
    fixture.create_text_file("report.docx", "quarterly numbers");

    fixture.sort(false);

    let content = fs::read_to_string(fixture.path().join("Documents/report.docx")).unwrap();
    assert_eq!(content, "quarterly numbers");
}

#[test]
fn test_status_lines_reported_per_file() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.png", "b.txt"]);

    let (_, sink) = fixture.sort(false);

    let mut lines = sink.status_lines();
    assert_eq!(lines.pop(), Some("Sorting complete.".to_string()));
    lines.sort();
    assert_eq!(
        lines,
        vec![
            "Moved: a.png → Images".to_string(),
            "Moved: b.txt → Documents".to_string(),
        ]
    );
}

// ============================================================================
// Test Suite 2: Month/year folders
// ============================================================================

#[test]
fn test_sort_with_date_folders() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.png", "b.txt", "c.xyz"]);
    for name in ["a.png", "b.txt", "c.xyz"] {
        fixture.set_modified(name, 2023, 6, 15);
    }

    let (report, sink) = fixture.sort(true);

    fixture.assert_file_exists("Images/June 2023/a.png");
    fixture.assert_file_exists("Documents/June 2023/b.txt");
    fixture.assert_file_exists("Others/June 2023/c.xyz");
    assert_eq!(report.moved, 3);

    let outcome = sink
        .outcomes()
        .find(|o| o.file_name == "a.png")
        .expect("outcome for a.png");
    assert_eq!(outcome.month_folder.as_deref(), Some("June 2023"));
    assert_eq!(outcome.status_line(), "Moved: a.png → June 2023/Images");
}

#[test]
fn test_date_folders_split_by_month() {
    let fixture = TestFixture::new();
    fixture.create_files(&["jan.jpg", "dec.jpg"]);
    fixture.set_modified("jan.jpg", 2024, 1, 10);
    fixture.set_modified("dec.jpg", 2022, 12, 31);

    fixture.sort(true);

    fixture.assert_file_exists("Images/January 2024/jan.jpg");
    fixture.assert_file_exists("Images/December 2022/dec.jpg");
}

// ============================================================================
// Test Suite 3: Invalid roots
// ============================================================================

#[test]
fn test_missing_root_is_fatal_and_touches_nothing() {
    let fixture = TestFixture::new();
    let missing = fixture.path().join("does-not-exist");

    let mut sink = CollectingSink::default();
    let result = FileOrganizer::sort_all(&SortRequest::new(&missing, false), &mut sink);

    assert!(matches!(result, Err(SortError::InvalidRoot { .. })));
    assert!(!missing.exists());
    assert!(fs::read_dir(fixture.path()).unwrap().next().is_none());
    assert_eq!(sink.events.len(), 1);
    assert_eq!(sink.fatal_errors().count(), 1);
    assert_eq!(sink.outcomes().count(), 0);
}

#[test]
fn test_root_that_is_a_file_is_fatal() {
    let fixture = TestFixture::new();
    fixture.create_files(&["plain.txt"]);

    let mut sink = CollectingSink::default();
    let result = FileOrganizer::sort_all(
        &SortRequest::new(fixture.path().join("plain.txt"), false),
        &mut sink,
    );

    assert!(matches!(result, Err(SortError::NotADirectory { .. })));
    fixture.assert_file_exists("plain.txt");
    assert_eq!(sink.fatal_errors().count(), 1);
}

// ============================================================================
// Test Suite 4: Idempotence, overwrite, directories
// ============================================================================

#[test]
fn test_sort_idempotent() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.png", "b.txt", "c.xyz"]);

    let (first, _) = fixture.sort(false);
    let layout = fixture.list_files_recursive();
    let (second, sink) = fixture.sort(false);

    assert_eq!(first.moved, 3);
    assert_eq!(second.total(), 0);
    assert_eq!(sink.outcomes().count(), 0);
    assert_eq!(fixture.list_files_recursive(), layout);
}

#[test]
fn test_sort_idempotent_with_date_folders() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.png"]);

    fixture.sort(true);
    let (second, _) = fixture.sort(true);

    assert_eq!(second.total(), 0);
}

#[test]
fn test_top_level_directories_untouched() {
    let fixture = TestFixture::new();
    fixture.create_subdir("projects.rs");
    fixture.create_subdir("nested");
    fs::write(fixture.path().join("nested/inner.png"), "x").unwrap();
    fixture.create_files(&["outer.png"]);

    let (report, _) = fixture.sort(false);

    assert_eq!(report.moved, 1);
    assert!(fixture.path().join("projects.rs").is_dir());
    fixture.assert_file_exists("nested/inner.png");
    fixture.assert_file_exists("Images/outer.png");
    fixture.assert_not_exists("Images/inner.png");
}

#[test]
fn test_existing_category_folders_reused() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Images");
    fs::write(fixture.path().join("Images/old.png"), "old").unwrap();
    fixture.create_files(&["new.png"]);

    fixture.sort(false);

    fixture.assert_file_exists("Images/old.png");
    fixture.assert_file_exists("Images/new.png");
}

#[test]
fn test_name_collision_overwrites_destination() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Documents");
    fs::write(fixture.path().join("Documents/notes.txt"), "old").unwrap();
    fixture.create_text_file("notes.txt", "new");

    let (report, _) = fixture.sort(false);

    assert_eq!(report.moved, 1);
    assert_eq!(report.failed, 0);
    fixture.assert_not_exists("notes.txt");
    let content = fs::read_to_string(fixture.path().join("Documents/notes.txt")).unwrap();
    assert_eq!(content, "new");
}

#[test]
fn test_per_file_failure_does_not_stop_run() {
    let fixture = TestFixture::new();
    // a directory at the destination path blocks the move
    fixture.create_subdir("Codes/main.py");
    fixture.create_files(&["main.py", "a.png", "b.pdf"]);

    let (report, sink) = fixture.sort(false);

    assert_eq!(report.moved, 2);
    assert_eq!(report.failed, 1);
    fixture.assert_file_exists("main.py");
    fixture.assert_file_exists("Images/a.png");
    fixture.assert_file_exists("Documents/b.pdf");

    let failure = sink.outcomes().find(|o| !o.success).expect("one failure");
    assert_eq!(failure.file_name, "main.py");
    assert_eq!(failure.category, Category::Codes);
    assert!(failure.error.is_some());
}

// ============================================================================
// Test Suite 5: Configuration
// ============================================================================

#[test]
fn test_configured_filters_leave_files_in_place() {
    let fixture = TestFixture::new();
    fixture.create_files(&["movie.mkv.part", "Thumbs.db", "keep.png"]);

    let config = SortConfig::from_toml(
        r#"
[filters.exclude]
filenames = ["Thumbs.db"]
patterns = ["*.part"]
"#,
    )
    .unwrap();
    let filters = config.compile_filters().unwrap();

    let mut sink = CollectingSink::default();
    let report = FileOrganizer::sort_all_with(
        &SortRequest::new(fixture.path(), false),
        &config.mapper(),
        Some(&filters),
        &mut sink,
    )
    .unwrap();

    assert_eq!(report.moved, 1);
    assert_eq!(report.skipped, 2);
    fixture.assert_file_exists("movie.mkv.part");
    fixture.assert_file_exists("Thumbs.db");
    fixture.assert_file_exists("Images/keep.png");
}

#[test]
fn test_configured_extensions_extend_categories() {
    let fixture = TestFixture::new();
    fixture.create_files(&["shot.heic", "Cargo.toml"]);

    let config = SortConfig::from_toml(
        r#"
[categories]
images = [".heic"]
codes = ["toml"]
"#,
    )
    .unwrap();

    let mut sink = CollectingSink::default();
    FileOrganizer::sort_all_with(
        &SortRequest::new(fixture.path(), false),
        &config.mapper(),
        None,
        &mut sink,
    )
    .unwrap();

    fixture.assert_file_exists("Images/shot.heic");
    fixture.assert_file_exists("Codes/Cargo.toml");
}

#[test]
fn test_plan_is_a_dry_run() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.png", "b.txt"]);

    let plan = FileOrganizer::plan(
        &SortRequest::new(fixture.path(), false),
        &SortConfig::default().mapper(),
        None,
    )
    .unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(fixture.count_root_files(), 2);
    fixture.assert_not_exists("Images");
    fixture.assert_not_exists("Documents");
}

// ============================================================================
// Test Suite 6: Channel delivery
// ============================================================================

#[test]
fn test_channel_sink_delivers_events_to_other_thread() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.png", "b.txt", "c.xyz"]);
    let root = fixture.path().to_path_buf();

    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        let mut sink = ChannelSink::new(tx);
        FileOrganizer::sort_all(&SortRequest::new(root, false), &mut sink)
    });

    let events: Vec<SortEvent> = rx.iter().collect();
    let report = worker.join().expect("worker panicked").expect("sort failed");

    assert_eq!(report.moved, 3);
    assert_eq!(events.len(), 4);
    assert!(matches!(events.last(), Some(SortEvent::Complete(r)) if r.moved == 3));
    assert!(events.iter().all(|e| !e.is_error()));
}
