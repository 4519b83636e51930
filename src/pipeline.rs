use crate::{
    aggregator::{format_size, Aggregator},
    config::Config,
    error::{ApiErrorKind, Error, Result},
    gemini::GeminiClient,
    report::{self, ReportWriter},
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Outcome of the analysis stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The model returned suggestions.
    Success,
    /// The API call failed; the failure message was printed and persisted.
    AnalysisFailed,
}

/// Statistics collected during a run.
#[derive(Debug, Clone)]
pub struct AnalysisStats {
    /// Outcome of the analysis stage
    pub status: RunStatus,

    /// Number of files that contributed content
    pub files_analyzed: usize,

    /// Cumulative UTF-8 byte size of aggregated content
    pub total_bytes: u64,

    /// Time spent scanning and aggregating
    pub scan_duration: Duration,

    /// Time spent waiting on the API
    pub api_duration: Duration,

    /// Total execution time
    pub duration: Duration,

    /// Where the report was saved, if persistence succeeded
    pub report_path: Option<PathBuf>,
}

impl AnalysisStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\nFiles analyzed: {}", self.files_analyzed);
        println!("Total size: {}", format_size(self.total_bytes));
        println!(
            "Completed in {:.2}s (scan {:.2}s, analysis {:.2}s)",
            self.duration.as_secs_f64(),
            self.scan_duration.as_secs_f64(),
            self.api_duration.as_secs_f64()
        );
        if let Some(path) = &self.report_path {
            println!("Analysis saved to: {}", path.display());
        }
    }
}

/// Orchestrates one analysis run: environment check, scan, analysis, report.
pub struct Pipeline {
    config: Config,
    aggregator: Aggregator,
    client: GeminiClient,
    writer: ReportWriter,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation or HTTP client
    /// construction fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let aggregator = Aggregator::new(&config);
        let client = GeminiClient::new(&config)?;
        let writer = ReportWriter::new(&config.output_dir);

        Ok(Self {
            config,
            aggregator,
            client,
            writer,
        })
    }

    /// Executes the run: EnvironmentCheck, Scan, Analyze, Report.
    ///
    /// The analysis result (success or the hint-augmented failure message)
    /// is printed to stdout and persisted to a timestamped report file.
    /// Persistence failure is a warning only.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential check fails or nothing analyzable
    /// is found; both happen before any analysis call.
    #[instrument(skip(self), fields(root_dir = %self.config.root_dir.display()))]
    pub fn run(self) -> Result<AnalysisStats> {
        let start_time = Instant::now();

        self.check_environment()?;

        info!("Target directory: {}", self.config.root_dir.display());

        let scan_start = Instant::now();
        let aggregate = self.aggregator.aggregate()?;
        let scan_duration = scan_start.elapsed();

        if aggregate.is_empty() {
            return Err(Error::no_files(&self.config.root_dir));
        }

        info!(
            "Scanned {} files ({}) in {:.2}s",
            aggregate.files_analyzed,
            format_size(aggregate.total_bytes),
            scan_duration.as_secs_f64()
        );

        let api_start = Instant::now();
        let analysis = self.client.get_suggestions(&aggregate.text);
        let api_duration = api_start.elapsed();

        let (status, body) = match analysis {
            Ok(text) => (RunStatus::Success, report::decorate(&text)),
            Err(e) => {
                warn!("Analysis failed: {}", e);
                (RunStatus::AnalysisFailed, report::failure_report(&e))
            }
        };

        println!("{body}");

        let report_path = match self.writer.write(&body, &self.config.root_dir) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Could not save analysis to file: {}", e);
                None
            }
        };

        Ok(AnalysisStats {
            status,
            files_analyzed: aggregate.files_analyzed,
            total_bytes: aggregate.total_bytes,
            scan_duration,
            api_duration,
            duration: start_time.elapsed(),
            report_path,
        })
    }

    /// Confirms the credential is functional before any work happens.
    fn check_environment(&self) -> Result<()> {
        if self.config.skip_validation {
            info!("Skipping API key validation");
            return Ok(());
        }

        info!("Validating environment...");
        if !self.client.validate_api_key() {
            return Err(Error::api(
                ApiErrorKind::Auth,
                "API connection failed. Please check your API key.",
            ));
        }

        info!("API connection successful");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::path::Path;

    fn create_test_config(root: &Path) -> Config {
        Config::builder()
            .root_dir(root)
            .output_dir(root.join("analysis_output"))
            .api_key("test-key")
            .skip_validation(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_pipeline_construction() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("print(1)").unwrap();

        let config = create_test_config(temp.path());
        assert!(Pipeline::new(config).is_ok());
    }

    #[test]
    fn test_empty_directory_fails_before_any_analysis_call() {
        let temp = assert_fs::TempDir::new().unwrap();

        let config = create_test_config(temp.path());
        let result = Pipeline::new(config).unwrap().run();

        // The run stops at the scan stage; no report file is created. The
        // error itself carries the operator guidance, so nothing else needs
        // to be printed for this condition.
        let err = result.unwrap_err();
        assert!(matches!(err, Error::NoFiles { .. }));
        assert!(err.to_string().contains("Check the directory path"));
        assert!(!temp.child("analysis_output").exists());
    }

    #[test]
    fn test_non_qualifying_files_count_as_empty() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("notes.txt").write_str("not source").unwrap();
        temp.child("README.md").write_str("# docs").unwrap();

        let config = create_test_config(temp.path());
        let result = Pipeline::new(config).unwrap().run();

        assert!(matches!(result.unwrap_err(), Error::NoFiles { .. }));
        assert!(!temp.child("analysis_output").exists());
    }
}
