//! File and directory eligibility rules.
//!
//! Decides, purely from a path's extension and directory names, whether a
//! file counts as source code and should be included in the aggregate.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::path::Path;

static DEFAULT_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "py", "js", "ts", "jsx", "tsx", "go", "java", "cs", "cpp", "c", "rb", "rs", "php", "kt",
        "swift", "scala",
    ]
    .into_iter()
    .collect()
});

static DEFAULT_IGNORED_DIRECTORIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "__pycache__",
        ".venv",
        "venv",
        ".env",
        ".git",
        "node_modules",
        ".next",
        "dist",
        "build",
        "target",
        ".gradle",
        ".idea",
        ".vscode",
        ".pytest_cache",
        ".mypy_cache",
        ".tox",
        "htmlcov",
        ".coverage",
        ".DS_Store",
    ]
    .into_iter()
    .collect()
});

static LANGUAGE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("py", "Python"),
        ("js", "JavaScript"),
        ("jsx", "React JavaScript"),
        ("ts", "TypeScript"),
        ("tsx", "React TypeScript"),
        ("go", "Go"),
        ("java", "Java"),
        ("cs", "C#"),
        ("cpp", "C++"),
        ("c", "C"),
        ("rb", "Ruby"),
        ("rs", "Rust"),
        ("php", "PHP"),
        ("kt", "Kotlin"),
        ("swift", "Swift"),
        ("scala", "Scala"),
    ]
    .into_iter()
    .collect()
});

/// Configuration data for the [`Classifier`].
///
/// The default sets cover common general-purpose languages and the usual
/// version-control, dependency-cache, build-output and IDE directories.
/// Both sets can be overridden without code changes.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Extensions (lowercase, without leading dot) that qualify as source.
    pub extensions: HashSet<String>,

    /// Directory base names pruned before descending.
    pub ignored_directories: HashSet<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            ignored_directories: DEFAULT_IGNORED_DIRECTORIES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Decides file and directory eligibility for inclusion in the aggregate.
///
/// Classification is purely path-based; no content sniffing.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    /// Creates a classifier with the given configuration.
    #[must_use]
    pub const fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Returns true if the file qualifies for inclusion.
    ///
    /// The check is a case-insensitive extension membership test.
    #[must_use]
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.config.extensions.contains(&ext.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    /// Returns true if a directory with this base name must be pruned.
    #[must_use]
    pub fn is_ignored_directory(&self, name: &str) -> bool {
        self.config.ignored_directories.contains(name)
    }

    /// Maps a file's extension to a human-readable language name.
    ///
    /// Unknown extensions map to "Unknown"; with the default allow-set this
    /// only happens when the extension tables are overridden inconsistently.
    #[must_use]
    pub fn language_for(&self, path: &Path) -> &'static str {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| LANGUAGE_NAMES.get(ext.to_ascii_lowercase().as_str()).copied())
            .unwrap_or("Unknown")
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}
