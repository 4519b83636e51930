//! Directory scanning and content aggregation.
//!
//! Walks the target tree depth-first, collects every qualifying source file
//! and concatenates the contents behind formatted headers. Per-file read
//! failures are recovered locally; the scan never aborts because of a
//! single bad file.

use crate::{
    classifier::Classifier,
    config::Config,
    error::{Error, Result},
    file::SourceFile,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Result of one aggregation pass over a directory tree.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    /// Concatenated, header-annotated content of all included files
    pub text: String,

    /// Number of files that contributed content
    pub files_analyzed: usize,

    /// Cumulative UTF-8 byte size of included content
    pub total_bytes: u64,
}

impl Aggregate {
    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Scans a root directory and aggregates qualifying source files.
pub struct Aggregator {
    root_dir: PathBuf,
    max_file_bytes: u64,
    classifier: Classifier,
}

impl Aggregator {
    /// Creates a new aggregator from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            max_file_bytes: config.max_file_bytes,
            classifier: Classifier::new(config.classifier_config.clone()),
        }
    }

    /// Walks the root directory and returns the aggregated content.
    ///
    /// An empty tree is not an error: the caller receives an empty
    /// [`Aggregate`] and decides what "nothing to analyze" means.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing or not a directory.
    pub fn aggregate(&self) -> Result<Aggregate> {
        if !self.root_dir.exists() {
            return Err(Error::io(
                &self.root_dir,
                std::io::Error::new(ErrorKind::NotFound, "directory does not exist"),
            ));
        }
        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "'{}' is not a directory",
                self.root_dir.display()
            )));
        }

        info!("Scanning directory: {}", self.root_dir.display());

        let files = self.collect_files();

        if files.is_empty() {
            warn!("No source files found in {}", self.root_dir.display());
            return Ok(Aggregate::default());
        }

        debug!("Found {} candidate files", files.len());

        let mut blocks = Vec::with_capacity(files.len());
        let mut files_analyzed = 0usize;
        let mut total_bytes = 0u64;

        for file in files {
            total_bytes += file.size_bytes();
            files_analyzed += 1;
            blocks.push(file.to_block());
        }

        info!(
            "Aggregated {} files ({})",
            files_analyzed,
            format_size(total_bytes)
        );

        Ok(Aggregate {
            text: blocks.join("\n"),
            files_analyzed,
            total_bytes,
        })
    }

    /// Collects qualifying, readable, non-empty files in traversal order.
    ///
    /// Ordering is made deterministic by sorting directory entries by file
    /// name, so the same tree always aggregates to identical bytes.
    fn collect_files(&self) -> Vec<SourceFile> {
        let classifier = self.classifier.clone();

        let walker = WalkDir::new(&self.root_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                if entry.file_type().is_dir() {
                    let name = entry.file_name().to_string_lossy();
                    // Never prune the root itself, only descendants.
                    entry.depth() == 0 || !classifier.is_ignored_directory(&name)
                } else {
                    true
                }
            });

        let mut files = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Walk error: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.classifier.is_source_file(path) {
                continue;
            }

            match self.read_source_file(path) {
                Ok(Some(file)) => files.push(file),
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        files
    }

    /// Reads a single candidate file.
    ///
    /// Returns `Ok(None)` for files that are excluded without being an
    /// error: empty files and files over the size ceiling.
    fn read_source_file(&self, path: &Path) -> Result<Option<SourceFile>> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::InvalidData {
                Error::invalid_utf8(path)
            } else {
                Error::io(path, e)
            }
        })?;

        if content.len() as u64 > self.max_file_bytes {
            warn!(
                "Skipping large file: {} ({} > {} bytes)",
                path.display(),
                content.len(),
                self.max_file_bytes
            );
            return Ok(None);
        }

        if content.is_empty() {
            debug!("Skipping empty file: {}", path.display());
            return Ok(None);
        }

        let relative_path = pathdiff::diff_paths(path, &self.root_dir)
            .unwrap_or_else(|| path.to_path_buf())
            .to_string_lossy()
            .to_string();

        let language = self.classifier.language_for(path);

        Ok(Some(SourceFile::new(relative_path, language, content)))
    }
}

/// Formats a byte count in a human-readable form.
#[must_use]
pub(crate) fn format_size(size_bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if size_bytes < KIB {
        format!("{size_bytes} bytes")
    } else if size_bytes < MIB {
        format!("{:.1} KB", size_bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", size_bytes as f64 / MIB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn create_aggregator(root: &Path) -> Aggregator {
        let config = Config::builder()
            .root_dir(root)
            .api_key("test-key")
            .build()
            .unwrap();
        Aggregator::new(&config)
    }

    #[test]
    fn test_single_python_file_block() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("print(1)").unwrap();

        let aggregate = create_aggregator(temp.path()).aggregate().unwrap();

        let delimiter = "=".repeat(80);
        let expected =
            format!("\n{delimiter}\nFILE: a.py\nLANGUAGE: Python\n{delimiter}\n\nprint(1)");
        assert_eq!(aggregate.text, expected);
        assert_eq!(aggregate.files_analyzed, 1);
        assert_eq!(aggregate.total_bytes, 8);
    }

    #[test]
    fn test_empty_directory_yields_empty_aggregate() {
        let temp = assert_fs::TempDir::new().unwrap();

        let aggregate = create_aggregator(temp.path()).aggregate().unwrap();

        assert!(aggregate.is_empty());
        assert_eq!(aggregate.files_analyzed, 0);
        assert_eq!(aggregate.total_bytes, 0);
    }

    #[test]
    fn test_non_qualifying_extensions_are_excluded() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("README.md").write_str("# readme").unwrap();
        temp.child("data.csv").write_str("a,b,c").unwrap();

        let aggregate = create_aggregator(temp.path()).aggregate().unwrap();

        assert!(aggregate.is_empty());
    }

    #[test]
    fn test_ignored_directories_are_pruned() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/main.py").write_str("print('ok')").unwrap();
        temp.child("node_modules/pkg/index.js")
            .write_str("module.exports = 1;")
            .unwrap();
        temp.child(".git/hooks/hook.py").write_str("print('no')").unwrap();

        let aggregate = create_aggregator(temp.path()).aggregate().unwrap();

        assert_eq!(aggregate.files_analyzed, 1);
        assert!(aggregate.text.contains("main.py"));
        assert!(!aggregate.text.contains("index.js"));
        assert!(!aggregate.text.contains("hook.py"));
    }

    #[test]
    fn test_oversized_file_is_skipped_without_abort() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("big.py")
            .write_str(&"x".repeat(2 * 1024 * 1024))
            .unwrap();
        temp.child("small.py").write_str("print(2)").unwrap();

        let aggregate = create_aggregator(temp.path()).aggregate().unwrap();

        assert_eq!(aggregate.files_analyzed, 1);
        assert!(aggregate.text.contains("small.py"));
        assert!(!aggregate.text.contains("big.py"));
        assert_eq!(aggregate.total_bytes, 8);
    }

    #[test]
    fn test_undecodable_file_is_skipped_without_abort() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("bad.py").write_binary(&[0xff, 0xfe, 0x00, 0x01]).unwrap();
        temp.child("good.py").write_str("print(3)").unwrap();

        let aggregate = create_aggregator(temp.path()).aggregate().unwrap();

        assert_eq!(aggregate.files_analyzed, 1);
        assert!(aggregate.text.contains("good.py"));
    }

    #[test]
    fn test_empty_files_are_excluded() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("empty.py").touch().unwrap();
        temp.child("full.py").write_str("print(4)").unwrap();

        let aggregate = create_aggregator(temp.path()).aggregate().unwrap();

        assert_eq!(aggregate.files_analyzed, 1);
        assert!(!aggregate.text.contains("empty.py"));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("b.py").write_str("print('b')").unwrap();
        temp.child("a.py").write_str("print('a')").unwrap();
        temp.child("sub/c.rs").write_str("fn main() {}").unwrap();

        let aggregator = create_aggregator(temp.path());
        let first = aggregator.aggregate().unwrap();
        let second = aggregator.aggregate().unwrap();

        assert_eq!(first.text, second.text);
        assert_eq!(first.files_analyzed, 3);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let aggregator = create_aggregator(temp.path());
        drop(temp);

        let result = aggregator.aggregate();
        assert!(result.is_err());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
