//! CardIntake - Statement Intake Client
//!
//! A CLI tool that submits credit card statement PDFs to a remote
//! extraction service and collects the extracted fields into a
//! browsable result collection with running statistics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, failed submission, etc.)
//!   2 - Failures present and --fail-on-error was set

use anyhow::{Context, Result};
use cardintake::cli::{Args, OutputFormat};
use cardintake::client::{self, ExtractionClient};
use cardintake::config::Config;
use cardintake::{intake, report};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("CardIntake v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_intake(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Intake failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .cardintake.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".cardintake.toml");

    if path.exists() {
        eprintln!("⚠️  .cardintake.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .cardintake.toml")?;

    println!("✅ Created .cardintake.toml with default settings.");
    println!("   Edit it to customize the service URL, timeout, and report format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete intake workflow. Returns exit code (0 or 2).
async fn run_intake(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let client = ExtractionClient::new(
        config.service.base_url.clone(),
        config.service.timeout_seconds,
    );

    // Informational paths exit before any submission
    if args.check {
        return handle_check(&client).await;
    }
    if args.list_issuers {
        return handle_list_issuers(&client).await;
    }

    let mut controller =
        intake::IntakeController::new(client, config.service.issuer_hint.clone());

    println!(
        "📤 Submitting {} statement(s) to {}",
        args.files.len(),
        config.service.base_url
    );

    // Failed calls in sequential mode are reported and skipped; the
    // one-shot path treats a failed call as fatal for the whole run.
    let mut call_failures = 0usize;

    if args.sequential {
        for file in &args.files {
            let name = client::display_name(file);
            let spinner = make_spinner(format!("Uploading {}...", name), args.quiet);

            controller.select(vec![file.clone()]);
            let outcome = controller.submit().await;

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            if let Err(e) = outcome {
                call_failures += 1;
                warn!("Submission failed for {}: {}", name, e);
                eprintln!("  ⚠️  {}: {}", name, e);
            }
        }
    } else {
        let spinner = make_spinner(
            format!("Uploading {} file(s)...", args.files.len()),
            args.quiet,
        );

        controller.select(args.files.clone());
        let outcome = controller.submit().await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        outcome?;
    }

    // Render the report from the live store state
    let records = controller.store().records();
    let store_stats = controller.store().stats();

    let output = match config.general.format {
        OutputFormat::Table => report::render_table(records, store_stats, &config.report),
        OutputFormat::Markdown => {
            report::generate_markdown_report(records, store_stats, &config.report)
        }
        OutputFormat::Json => report::generate_json_report(records, store_stats)?,
    };

    match &config.general.output {
        Some(path) => {
            report::write_report(Path::new(path), &output)?;
            println!("✅ Report saved to: {}", path);
        }
        None => {
            println!("\n{}", output);
        }
    }

    println!("\n📊 Intake Summary:");
    println!(
        "   Statements: {} | Success rate: {}% | Avg confidence: {}%",
        store_stats.total_parsed, store_stats.success_rate, store_stats.avg_confidence
    );
    if call_failures > 0 {
        println!("   Failed submissions: {}", call_failures);
    }

    if config.general.fail_on_error {
        let has_failed_records = records.iter().any(|r| !r.is_success());
        if has_failed_records || call_failures > 0 {
            eprintln!("\n⛔ Failures present. Failing (exit code 2).");
            return Ok(2);
        }
    }

    Ok(0)
}

/// Handle --check: probe the service health endpoint.
async fn handle_check(client: &ExtractionClient) -> Result<i32> {
    let health = client.health().await?;
    println!("✅ Service is {}", health.status);
    if let Some(ts) = health.timestamp {
        println!("   Service time: {}", ts);
    }
    Ok(0)
}

/// Handle --list-issuers: print the issuers the service supports.
async fn handle_list_issuers(client: &ExtractionClient) -> Result<i32> {
    let issuers = client.supported_issuers().await?;

    if issuers.is_empty() {
        println!("The service reports no supported issuers.");
    } else {
        println!("Supported issuers ({}):", issuers.len());
        for issuer in issuers {
            println!("  💳 {}", issuer);
        }
    }
    Ok(0)
}

/// Spinner shown while a submission is in flight.
fn make_spinner(message: String, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .cardintake.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
