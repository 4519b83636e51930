use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for the code-advisor library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// No analyzable source files found in directory.
    #[error("No analyzable source files found in '{path}'. Check the directory path and supported extensions.")]
    NoFiles {
        /// Directory that was scanned
        path: PathBuf,
    },

    /// Invalid UTF-8 encountered in file.
    #[error("Invalid UTF-8 encoding in file '{path}'. File may be binary or use unsupported encoding.")]
    InvalidUtf8 {
        /// Path to file with encoding issues
        path: PathBuf,
    },

    /// Error returned by or while talking to the Gemini API.
    #[error("Error communicating with Gemini API: {message}")]
    Api {
        /// Classified error category
        kind: ApiErrorKind,
        /// Human-readable error message (credential already censored)
        message: String,
    },
}

/// Categories of API failures, classified from status codes and error text.
///
/// Each kind carries a fixed troubleshooting hint shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiErrorKind {
    /// Credential rejected or malformed.
    Auth,
    /// Usage quota or rate limit exceeded.
    Quota,
    /// Transport-level failure (DNS, connect, timeout).
    Network,
    /// The service answered but returned no text.
    EmptyResponse,
    /// The response body could not be interpreted.
    InvalidResponse,
    /// Any other non-success HTTP status.
    Http,
}

impl ApiErrorKind {
    /// Returns the troubleshooting hint for this error category, if any.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::Auth => {
                Some("Make sure your GEMINI_API_KEY is set correctly in the .env file.")
            }
            Self::Quota => Some(
                "You may have exceeded your API quota. Check your Google AI Studio dashboard.",
            ),
            Self::Network => Some("Check your internet connection and try again."),
            Self::EmptyResponse | Self::InvalidResponse | Self::Http => None,
        }
    }
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid UTF-8 error.
    #[must_use]
    pub fn invalid_utf8(path: impl Into<PathBuf>) -> Self {
        Self::InvalidUtf8 { path: path.into() }
    }

    /// Creates a no files error.
    #[must_use]
    pub fn no_files(path: impl Into<PathBuf>) -> Self {
        Self::NoFiles { path: path.into() }
    }

    /// Creates an API error of the given kind.
    #[must_use]
    pub fn api(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self::Api {
            kind,
            message: message.into(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns the API error category, if this is an API error.
    #[must_use]
    pub const fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("test message");
        assert!(err.is_config());
        assert!(err.to_string().contains("test message"));
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/tmp/test.txt", io_err);
        assert!(err.is_io());
        assert!(err.to_string().contains("/tmp/test.txt"));
    }

    #[test]
    fn test_api_error_kind_is_branchable() {
        let err = Error::api(ApiErrorKind::Quota, "429 Too Many Requests");
        assert_eq!(err.api_kind(), Some(ApiErrorKind::Quota));
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_quota_hint_mentions_quota() {
        let hint = ApiErrorKind::Quota.hint().unwrap();
        assert!(hint.contains("exceeded your API quota"));
    }

    #[test]
    fn test_http_kind_has_no_hint() {
        assert!(ApiErrorKind::Http.hint().is_none());
    }

    #[test]
    fn test_error_clone() {
        let err = Error::config("test");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
