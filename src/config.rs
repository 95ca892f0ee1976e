//! Configuration loading for the command-line front end.
//!
//! Two kinds of settings live in a TOML file:
//! - Entry filters that leave matching files in place
//!   (exact filenames, globs, extensions, regexes, plus an include whitelist)
//! - Extra extensions appended to the built-in category tables
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//!
//! [categories]
//! images = [".heic"]
//! codes = [".toml"]
//! ```
//!
//! The defaults exclude nothing, so every file in the root is sorted.

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::file_category::{Category, FileMapper, normalize_extension};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".filesortrc.toml";

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided.
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortConfig {
    #[serde(default)]
    pub filters: FilterRules,

    #[serde(default)]
    pub categories: CategoryExtensions,
}

/// Which root entries are left in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether dotfiles are sorted. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist, overrides every exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for leaving files out of a sort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g. "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions, with or without the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regexes matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Extra extensions per category, appended after the built-in ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryExtensions {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub shortcuts: Vec<String>,
    #[serde(default)]
    pub icons: Vec<String>,
    #[serde(default)]
    pub arts: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub codes: Vec<String>,
}

impl CategoryExtensions {
    fn entries(&self) -> [(Category, &[String]); 7] {
        [
            (Category::Images, self.images.as_slice()),
            (Category::Documents, self.documents.as_slice()),
            (Category::Shortcuts, self.shortcuts.as_slice()),
            (Category::Icons, self.icons.as_slice()),
            (Category::Arts, self.arts.as_slice()),
            (Category::Videos, self.videos.as_slice()),
            (Category::Codes, self.codes.as_slice()),
        ]
    }
}

impl SortConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if provided
    /// 2. `.filesortrc.toml` in the current directory
    /// 3. `~/.config/filesort/config.toml`
    /// 4. Defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or if any file
    /// that is found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::locate(config_path) {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Returns the file [`SortConfig::load`] would read, if any.
    ///
    /// An explicit `config_path` is returned even when it does not exist, so
    /// loading it reports the missing file.
    pub fn locate(config_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(path.to_path_buf());
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = PathBuf::from(std::env::var_os("HOME")?)
            .join(".config")
            .join("filesort")
            .join("config.toml");
        home_config.exists().then_some(home_config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Builds the category mapper: built-in tables plus configured extras.
    pub fn mapper(&self) -> FileMapper {
        let mut mapper = FileMapper::default();
        for (category, extensions) in self.categories.entries() {
            if !extensions.is_empty() {
                mapper.extend_category(category, extensions);
            }
        }
        mapper
    }

    /// Compiles the entry filters.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Pre-compiled entry filters.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// True when no rule can exclude anything.
    pub fn is_pass_through(&self) -> bool {
        self.enable_hidden_files
            && self.exclude_filenames.is_empty()
            && self.exclude_extensions.is_empty()
            && self.exclude_patterns.is_empty()
            && self.exclude_regexes.is_empty()
    }

    /// Whether a root entry should be sorted.
    ///
    /// Only the file name is matched; entries are always direct children of
    /// the root. Include patterns win over every exclude rule.
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext = normalize_extension(&ext.to_string_lossy());
            if self.exclude_extensions.contains(&ext) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}
