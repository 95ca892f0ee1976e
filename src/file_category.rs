//! Extension-based file categorization.
//!
//! Every file is assigned to one of eight fixed categories by looking its
//! extension up in a set of static tables. The tables are checked in a fixed
//! order and the first match wins, so an extension listed under two
//! categories always resolves to the earlier one.
//!
//! # Examples
//!
//! ```
//! use filesort::file_category::{Category, category_of};
//!
//! assert_eq!(category_of(".png"), Category::Images);
//! assert_eq!(category_of(".PDF"), Category::Documents);
//! assert_eq!(category_of(".xyz"), Category::Others);
//! assert_eq!(category_of(""), Category::Others);
//! ```

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// A destination folder for sorted files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    /// Raster images (PNG, JPG, GIF, ...)
    Images,
    /// Text and office documents
    Documents,
    /// Windows shell shortcuts
    Shortcuts,
    /// Icon files
    Icons,
    /// Drawing application projects and WebP art
    Arts,
    /// Video containers
    Videos,
    /// Source code and structured data
    Codes,
    /// Anything not matched by another category
    Others,
}

impl Category {
    /// Categories in lookup order, catch-all last.
    pub const ALL: [Category; 8] = [
        Category::Images,
        Category::Documents,
        Category::Shortcuts,
        Category::Icons,
        Category::Arts,
        Category::Videos,
        Category::Codes,
        Category::Others,
    ];

    /// Returns the folder name files of this category are moved into.
    ///
    /// ```
    /// use filesort::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Others.dir_name(), "Others");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Shortcuts => "Shortcuts",
            Category::Icons => "Icons",
            Category::Arts => "Arts",
            Category::Videos => "Videos",
            Category::Codes => "Codes",
            Category::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

pub const IMAGE_EXT: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".bmp", ".tiff", ".avif"];

pub const DOC_EXT: &[&str] = &[".pdf", ".txt", ".docx", ".doc", ".odt", ".odp"];

pub const SHORTCUT_EXT: &[&str] = &[".lnk"];

pub const ICON_EXT: &[&str] = &[".ico", ".svg"];

pub const ART_EXT: &[&str] = &[".sai", ".webp", ".clip"];

pub const VIDEO_EXT: &[&str] = &[
    ".mp4", ".mkv", ".avi", ".mov", ".wmv", ".flv", ".webm", ".mpeg", ".mpg", ".3gp", ".m4v",
    ".ts", ".vob", ".ogv", ".rm", ".rmvb", ".asf", ".divx", ".f4v", ".mts", ".m2ts",
];

// ".ts" is also listed under videos; videos are checked first.
pub const CODE_EXT: &[&str] = &[
    ".py", ".java", ".c", ".cpp", ".h", ".hpp", ".js", ".ts", ".jsx", ".tsx", ".html", ".css",
    ".scss", ".php", ".rb", ".go", ".rs", ".swift", ".kt", ".cs", ".vb", ".sh", ".bat", ".ps1",
    ".sql", ".json", ".xml", ".yaml", ".yml",
];

/// Built-in tables in lookup order.
const DEFAULT_TABLES: [(Category, &[&str]); 7] = [
    (Category::Images, IMAGE_EXT),
    (Category::Documents, DOC_EXT),
    (Category::Shortcuts, SHORTCUT_EXT),
    (Category::Icons, ICON_EXT),
    (Category::Arts, ART_EXT),
    (Category::Videos, VIDEO_EXT),
    (Category::Codes, CODE_EXT),
];

/// Classifies an extension (with its leading dot) using the built-in tables.
///
/// Matching is case-insensitive. Unknown extensions, and the empty string,
/// resolve to [`Category::Others`].
pub fn category_of(extension: &str) -> Category {
    let ext = extension.to_lowercase();
    DEFAULT_TABLES
        .iter()
        .find(|(_, table)| table.contains(&ext.as_str()))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Others)
}

/// Returns the final extension of `path` with a leading dot, or `""`.
///
/// Dotfiles such as `.bashrc` have no extension.
///
/// ```
/// use filesort::file_category::extension_of;
/// use std::path::Path;
///
/// assert_eq!(extension_of(Path::new("photo.PNG")), ".PNG");
/// assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
/// assert_eq!(extension_of(Path::new(".bashrc")), "");
/// assert_eq!(extension_of(Path::new("README")), "");
/// ```
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Normalizes a user-supplied extension to lower case with a leading dot.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_lowercase();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

/// A set of extensions mapped to a single category.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    category: Category,
    extensions: HashSet<String>,
}

impl CategoryRule {
    /// Creates a rule; extensions are normalized on the way in.
    pub fn new<I, S>(category: Category, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            category,
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns true if the already lower-cased `extension` belongs to this rule.
    pub fn matches(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }
}

/// Ordered collection of category rules.
///
/// The built-in rules can be extended with extra extensions per category;
/// lookup order stays the category order of [`Category::ALL`].
#[derive(Debug, Clone)]
pub struct FileMapper {
    rules: Vec<CategoryRule>,
}

impl FileMapper {
    /// Creates a mapper with the built-in tables only.
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_TABLES
                .iter()
                .map(|(category, table)| CategoryRule::new(*category, table.iter()))
                .collect(),
        }
    }

    /// Adds extra extensions to the rule of `category`.
    ///
    /// Extensions added to [`Category::Others`] are ignored, since anything
    /// unmatched already lands there.
    pub fn extend_category<I, S>(&mut self, category: Category, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra = CategoryRule::new(category, extensions);
        if let Some(rule) = self.rules.iter_mut().find(|r| r.category == category) {
            rule.extensions.extend(extra.extensions);
        }
    }

    /// Classifies an extension with the first matching rule.
    pub fn category_of(&self, extension: &str) -> Category {
        let ext = extension.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&ext))
            .map(CategoryRule::category)
            .unwrap_or(Category::Others)
    }

    /// Classifies a path by its final extension.
    pub fn categorize_path(&self, path: &Path) -> Category {
        self.category_of(&extension_of(path))
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}
