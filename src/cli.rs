//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CardIntake - submit credit card statement PDFs to an extraction service
///
/// Uploads one or more PDF statements to a remote extraction service,
/// collects the extracted fields, and prints a result collection with
/// running summary statistics.
///
/// Examples:
///   cardintake statement.pdf
///   cardintake jan.pdf feb.pdf mar.pdf --format markdown -o results.md
///   cardintake *.pdf --sequential --fail-on-error
///   cardintake --list-issuers
///   cardintake --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// PDF statement files to submit
    ///
    /// One file is sent to /api/parse; two or more go to /api/batch-parse
    /// as a single multipart request.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Base URL of the extraction service
    #[arg(
        short,
        long,
        default_value = "http://localhost:5000",
        env = "CARDINTAKE_SERVICE_URL",
        value_name = "URL"
    )]
    pub service_url: String,

    /// Request timeout in seconds
    ///
    /// A submission that exceeds the timeout is reported as an error.
    /// Default: from config or 120s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Issuer hint forwarded with single-file submissions
    ///
    /// Example: --issuer Chase. See --list-issuers for supported values.
    #[arg(short, long, value_name = "NAME")]
    pub issuer: Option<String>,

    /// Submit each file as its own single-file call
    ///
    /// Results accumulate across calls, newest first. A file that fails
    /// prints its error and the run continues with the remaining files.
    #[arg(long)]
    pub sequential: bool,

    /// Report format (table, markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .cardintake.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List the issuers the service supports and exit
    #[arg(long)]
    pub list_issuers: bool,

    /// Probe the service health endpoint and exit
    #[arg(long)]
    pub check: bool,

    /// Exit with code 2 when any record failed or a submission errored
    ///
    /// Useful for scripted pipelines.
    #[arg(long)]
    pub fail_on_error: bool,

    /// Generate a default .cardintake.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Console table (default)
    #[default]
    Table,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether this invocation submits files (as opposed to the
    /// informational --list-issuers / --check paths).
    pub fn has_submission(&self) -> bool {
        !self.files.is_empty()
    }

    /// Validate the parsed arguments.
    ///
    /// The PDF pre-filter lives here: the intake controller assumes its
    /// input has already been checked, so non-PDF and missing paths are
    /// rejected before anything is submitted.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.files.is_empty() && !self.list_issuers && !self.check {
            return Err("No files given. Pass one or more PDF statements, or use \
                 --list-issuers / --check / --init-config."
                .to_string());
        }

        for path in &self.files {
            if !path.exists() {
                return Err(format!("File does not exist: {}", path.display()));
            }
            if !path.is_file() {
                return Err(format!("Not a file: {}", path.display()));
            }
            let is_pdf = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if !is_pdf {
                return Err(format!(
                    "Only PDF files are accepted: {}",
                    path.display()
                ));
            }
        }

        // Validate service URL format
        if !self.service_url.starts_with("http://") && !self.service_url.starts_with("https://") {
            return Err("Service URL must start with 'http://' or 'https://'".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
