use crate::classifier::ClassifierConfig;
use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_OUTPUT_DIR: &str = "analysis_output";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_VALIDATION_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TEMPERATURE: f64 = 0.3;
const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Configuration for one analysis run.
///
/// Use [`Config::builder()`] to construct a new configuration. The value is
/// immutable once built and passed by reference into the components that
/// need it; there is no ambient global.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory to scan for source files
    pub root_dir: PathBuf,

    /// Directory where report files are written
    pub output_dir: PathBuf,

    /// Gemini API credential
    pub api_key: String,

    /// Model used for the main analysis call
    pub model: String,

    /// Cheaper model variant used only for credential validation
    pub validation_model: String,

    /// Sampling temperature for the analysis call
    pub temperature: f64,

    /// Per-file content ceiling in bytes; larger files are skipped
    pub max_file_bytes: u64,

    /// Timeout applied to each API request
    pub request_timeout: Duration,

    /// Maximum request attempts for transient failures
    pub max_attempts: u32,

    /// Skip the live credential validation call
    pub skip_validation: bool,

    /// File and directory eligibility rules
    pub classifier_config: ClassifierConfig,
}

impl Config {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or is not a directory
    /// - The API key is empty
    /// - Limits are zero
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::config(format!(
                "Directory does not exist: {}",
                self.root_dir.display()
            )));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        if self.api_key.is_empty() {
            return Err(Error::config(
                "GEMINI_API_KEY not found. Get a key from Google AI Studio and set it in the \
                 environment or a .env file in the project root.",
            ));
        }

        if self.max_file_bytes == 0 {
            return Err(Error::config("max_file_bytes must be greater than 0"));
        }

        if self.max_attempts == 0 {
            return Err(Error::config("max_attempts must be at least 1"));
        }

        Ok(())
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    api_key: Option<String>,
    model: Option<String>,
    validation_model: Option<String>,
    temperature: Option<f64>,
    max_file_bytes: Option<u64>,
    request_timeout: Option<Duration>,
    max_attempts: Option<u32>,
    skip_validation: bool,
    classifier_config: Option<ClassifierConfig>,
}

impl ConfigBuilder {
    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the report output directory.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Sets the API credential. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into().trim().to_string());
        self
    }

    /// Sets the analysis model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the model used for credential validation.
    #[must_use]
    pub fn validation_model(mut self, model: impl Into<String>) -> Self {
        self.validation_model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the per-file size ceiling in bytes.
    #[must_use]
    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.max_file_bytes = Some(bytes);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the retry attempt limit for transient API failures.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Skips the live credential validation call.
    #[must_use]
    pub fn skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    /// Sets the file and directory eligibility rules.
    #[must_use]
    pub fn classifier_config(mut self, config: ClassifierConfig) -> Self {
        self.classifier_config = Some(config);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            root_dir: self.root_dir.unwrap_or_else(|| PathBuf::from(".")),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            api_key: self.api_key.unwrap_or_default(),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            validation_model: self
                .validation_model
                .unwrap_or_else(|| DEFAULT_VALIDATION_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_file_bytes: self.max_file_bytes.unwrap_or(DEFAULT_MAX_FILE_BYTES),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            skip_validation: self.skip_validation,
            classifier_config: self.classifier_config.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder()
            .root_dir(temp.path())
            .api_key("key")
            .build()
            .unwrap();

        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.validation_model, DEFAULT_VALIDATION_MODEL);
        assert_eq!(config.max_file_bytes, 1024 * 1024);
        assert_eq!(config.output_dir, PathBuf::from("analysis_output"));
        assert!((config.temperature - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder().root_dir(temp.path()).build();

        let err = result.unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert!(err.to_string().contains("Google AI Studio"));
    }

    #[test]
    fn test_api_key_is_trimmed() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder()
            .root_dir(temp.path())
            .api_key("  key-with-spaces \n")
            .build()
            .unwrap();

        assert_eq!(config.api_key, "key-with-spaces");
    }

    #[test]
    fn test_invalid_root_dir() {
        let result = Config::builder()
            .root_dir("/nonexistent/path/that/should/not/exist")
            .api_key("key")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        use assert_fs::prelude::*;
        let file = temp.child("file.txt");
        file.write_str("not a dir").unwrap();

        let result = Config::builder()
            .root_dir(file.path())
            .api_key("key")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder()
            .root_dir(temp.path())
            .api_key("key")
            .max_attempts(0)
            .build();

        assert!(result.is_err());
    }
}
