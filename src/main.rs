use anyhow::Context;
use clap::Parser;
use code_advisor::{Config, Pipeline, RunStatus};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static WORK_STARTED: AtomicBool = AtomicBool::new(false);

#[derive(Parser, Debug)]
#[command(
    name = "code-advisor",
    version,
    author,
    about = "AI-powered code analysis using Google Gemini",
    long_about = "Analyze a codebase with Google Gemini and get actionable suggestions.\n\n\
    This tool scans a directory for source files, aggregates their content and asks \
    Gemini for 3-5 architectural suggestions with file references. The result is \
    printed and saved to a timestamped report file.\n\n\
    USAGE EXAMPLES:\n  \
      # Analyze a project\n  \
      code-advisor --path ./my-project\n\n  \
      # Custom report directory\n  \
      code-advisor --path ./src --out ./reports\n\n\
    ENVIRONMENT SETUP:\n  \
      1. Get a Gemini API key from Google AI Studio\n  \
      2. Create a .env file in the project root\n  \
      3. Add: GEMINI_API_KEY=your_api_key_here"
)]
struct Cli {
    /// Path to the directory containing source code to analyze
    #[arg(short, long, value_name = "PATH")]
    path: PathBuf,

    /// Output directory for report files
    #[arg(short, long, default_value = "analysis_output", value_name = "PATH")]
    out: PathBuf,

    /// Gemini model used for the analysis call
    #[arg(long, default_value = "gemini-2.5-pro")]
    model: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Maximum attempts per request for transient failures
    #[arg(long, default_value_t = 4)]
    max_attempts: u32,

    /// Skip the live API key validation call
    #[arg(long)]
    skip_validation: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    // Interruption before any work begins is a normal goodbye; once the
    // run has started it is an abort.
    if let Err(e) = ctrlc::set_handler(|| {
        if WORK_STARTED.load(Ordering::SeqCst) {
            eprintln!("\n\nAnalysis interrupted by user.");
            std::process::exit(1);
        }
        eprintln!("\n\nGoodbye!");
        std::process::exit(0);
    }) {
        eprintln!("Warning: could not install interrupt handler: {e}");
    }

    match try_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    // .env is optional; a key already in the environment wins.
    dotenvy::dotenv().ok();
    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();

    let config = Config::builder()
        .root_dir(cli.path)
        .output_dir(cli.out)
        .api_key(api_key)
        .model(cli.model)
        .request_timeout(Duration::from_secs(cli.timeout_secs))
        .max_attempts(cli.max_attempts)
        .skip_validation(cli.skip_validation)
        .build()
        .context("Failed to build configuration")?;

    let pipeline = Pipeline::new(config).context("Failed to create pipeline")?;

    WORK_STARTED.store(true, Ordering::SeqCst);

    let stats = pipeline.run().context("Analysis failed")?;
    stats.print_summary();

    Ok(match stats.status {
        RunStatus::Success => ExitCode::SUCCESS,
        RunStatus::AnalysisFailed => ExitCode::FAILURE,
    })
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("code_advisor=info"),
        1 => EnvFilter::new("code_advisor=debug"),
        _ => EnvFilter::new("code_advisor=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
