//! # code-advisor
//!
//! Analyze a codebase with Google Gemini and get actionable architectural
//! suggestions.
//!
//! ## Quick Start
//!
//! ```no_run
//! use code_advisor::Config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./src")
//!     .api_key(std::env::var("GEMINI_API_KEY")?)
//!     .build()?;
//!
//! let stats = code_advisor::run(config)?;
//! stats.print_summary();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The tool runs a strictly sequential pipeline:
//! 1. **Classifier**: decides file and directory eligibility from the path
//! 2. **Aggregator**: walks the tree and concatenates annotated file blocks
//! 3. **Gemini client**: sends the aggregate for review, one blocking call
//! 4. **Report**: prints the result and persists a timestamped report file

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic
)]
#![allow(clippy::module_name_repetitions)]

mod aggregator;
mod classifier;
mod config;
mod error;
mod file;
mod gemini;
mod pipeline;
pub mod report;

pub use aggregator::{Aggregate, Aggregator};
pub use classifier::{Classifier, ClassifierConfig};
pub use config::{Config, ConfigBuilder};
pub use error::{ApiErrorKind, Error, Result};
pub use file::SourceFile;
pub use gemini::{GeminiClient, NO_CONTENT_MESSAGE};
pub use pipeline::{AnalysisStats, Pipeline, RunStatus};

/// Runs the complete analysis pipeline with the given configuration.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The credential check fails
/// - No analyzable source files are found
pub fn run(config: Config) -> Result<AnalysisStats> {
    Pipeline::new(config)?.run()
}
