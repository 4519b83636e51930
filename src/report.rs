//! Report decoration and persistence.
//!
//! Wraps the model's reply (or a failure message) with the fixed banner and
//! footer, and writes one timestamped report file per run.

use crate::error::{Error, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

const RESULT_DELIMITER_WIDTH: usize = 80;
const FILE_DELIMITER_WIDTH: usize = 50;

/// Wraps raw response text with the fixed analysis banner and footer.
#[must_use]
pub fn decorate(response_text: &str) -> String {
    let delimiter = "=".repeat(RESULT_DELIMITER_WIDTH);
    format!(
        "\n{delimiter}\nCODE ANALYSIS RESULTS\n{delimiter}\n\n{body}\n\n{delimiter}\nAnalysis powered by Google Gemini\n{delimiter}\n",
        body = response_text.trim(),
    )
}

/// Formats an analysis failure for display and persistence.
///
/// The message is augmented with the troubleshooting hint of the error's
/// category, when one exists.
#[must_use]
pub fn failure_report(error: &Error) -> String {
    match error.api_kind().and_then(|kind| kind.hint()) {
        Some(hint) => format!("{error}\nHint: {hint}"),
        None => error.to_string(),
    }
}

/// Writes analysis reports under a fixed output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Creates a writer targeting the given output directory.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Persists the report to a new timestamped file and returns its path.
    ///
    /// The output directory is created if absent. Files are written once
    /// and never mutated afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write(&self, report: &str, analyzed_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| Error::io(&self.output_dir, e))?;

        let now = chrono::Local::now();
        let filename = format!("analysis_{}.txt", now.format("%Y%m%d_%H%M%S"));
        let path = self.output_dir.join(filename);

        let content = render_report_file(
            report,
            analyzed_dir,
            &now.format("%Y-%m-%d %H:%M:%S").to_string(),
        );

        write_file_atomic(&path, &content)?;

        info!("Analysis saved to: {}", path.display());
        Ok(path)
    }
}

/// Renders the full on-disk report layout.
fn render_report_file(report: &str, analyzed_dir: &Path, generated_at: &str) -> String {
    let delimiter = "=".repeat(FILE_DELIMITER_WIDTH);
    format!(
        "Code Advisor Analysis Report\n{delimiter}\nGenerated: {generated_at}\nAnalyzed Directory: {dir}\n{delimiter}\n\n{report}\n\n{delimiter}\nEnd of Analysis Report\n",
        dir = analyzed_dir.display(),
    )
}

/// Writes a file atomically: temp file, sync, rename.
fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
    drop(temp_file);

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
