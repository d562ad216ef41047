//! # Research Pipeline CLI
//!
//! Asks for a research question, runs the plan → search → write pipeline
//! and prints the report.
//!
//! ## Quick Start
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run -- "What changed in the Rust 2024 edition?"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use research_pipeline::{
    Config, ConsoleReporter, Dashboard, DashboardReporter, Report, ResearchOrchestrator,
    RigGateway, WriterPacing,
};

const REPORT_HEADER: &str = "===== REPORT =====";
const REPORT_FOOTER: &str = "====================";

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "research-pipeline",
    version,
    about = "Plans web searches for a question, runs them concurrently and writes a report",
    long_about = r#"
Research Pipeline - plan, search, write.

For a research question it will:
  1. Ask a planner agent which web searches to run
  2. Run every search concurrently, each summarized by a search agent
  3. Have a writer agent turn the summaries into a markdown report

Failed searches are skipped; the report is written from whatever succeeded.

PREREQUISITES:
  OPENAI_API_KEY must be set (environment or .env file).

EXAMPLES:
  # Ask interactively
  research-pipeline

  # Pass the question directly
  research-pipeline "impact of remote work on city centers"

  # Machine-readable progress on stderr for a UI front-end
  research-pipeline --progress json "history of the borrow checker"
"#
)]
struct Args {
    /// The research question. Prompted for on stdin when omitted.
    #[arg(value_name = "QUERY")]
    query: Option<String>,

    /// Model used by all agents (overrides RESEARCH_MODEL)
    #[arg(short = 'm', long = "model", env = "RESEARCH_MODEL")]
    model: Option<String>,

    /// How progress is shown
    #[arg(long = "progress", value_enum, default_value_t = ProgressMode::Console)]
    progress: ProgressMode,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", default_value = "false")]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProgressMode {
    /// One line per update on stdout
    Console,
    /// Dashboard snapshots as JSON lines on stderr
    Json,
}

// =============================================================================
// MAIN
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env()?;
    init_logging(log_filter(args.verbose, &config.log_level))?;

    if let Some(model) = args.model {
        info!(model = %model, "Using model from command line");
        config.model = model;
    }
    // Configuration problems surface here, before any agent runs.
    config.validate()?;
    info!(config = ?config, "Configuration loaded");

    let query = match args.query {
        Some(query) => query,
        None => prompt_for_query().await?,
    };
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("Please enter a research question");
    }

    let pacing = WriterPacing::default().with_update_interval(config.writer_update_interval);
    let gateway = RigGateway::new(config);

    let result = match args.progress {
        ProgressMode::Console => {
            ResearchOrchestrator::new(gateway, ConsoleReporter::stdout())
                .with_writer_pacing(pacing)
                .run(query)
                .await
        }
        ProgressMode::Json => {
            let (reporter, rx) = DashboardReporter::new();
            let printer = tokio::spawn(print_dashboard(rx));
            let result = {
                // The reporter is dropped with the orchestrator, which closes
                // the channel and lets the printer finish.
                let orchestrator =
                    ResearchOrchestrator::new(gateway, reporter).with_writer_pacing(pacing);
                orchestrator.run(query).await
            };
            if let Err(e) = printer.await {
                error!(error = %e, "Progress printer task failed");
            }
            result
        }
    };

    match result {
        Ok(report) => {
            println!("{}", render_report(&report));
            info!("Research completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Research failed");
            eprintln!("\n❌ Research failed: {e:#}");
            if e.to_string().contains("401") || e.to_string().contains("api key") {
                eprintln!("\n💡 Tip: check that OPENAI_API_KEY is valid");
            }
            Err(e.into())
        }
    }
}

/// Ask for the question on stdin.
async fn prompt_for_query() -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(b"Enter your research question: ")
        .await
        .context("Failed to write prompt")?;
    stdout.flush().await.context("Failed to write prompt")?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read the research question from stdin")?;
    Ok(line)
}

/// Print every dashboard change as one JSON line on stderr.
async fn print_dashboard(mut rx: watch::Receiver<Dashboard>) {
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        match serde_json::to_string(&snapshot) {
            Ok(line) => eprintln!("{line}"),
            Err(e) => error!(error = %e, "Failed to serialize dashboard"),
        }
    }
}

/// The report framed by delimiter lines, with references appended when the
/// markdown does not already list them.
fn render_report(report: &Report) -> String {
    let mut out = format!("\n\n{REPORT_HEADER}\n\n{}\n", report.markdown_report.trim_end());
    if !report.has_inline_references() {
        out.push_str("\nReferences:\n");
        for url in &report.references {
            out.push_str(&format!("- {url}\n"));
        }
    }
    out.push_str(&format!("\n{REPORT_FOOTER}"));
    out
}

// =============================================================================
// LOGGING
// =============================================================================
/// `--verbose` wins over the configured level; an unparsable level falls
/// back to `info`.
fn log_filter(verbose: bool, level: &str) -> EnvFilter {
    if verbose {
        return EnvFilter::new(Level::DEBUG.as_str());
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str()))
}

/// Logs go to stderr so stdout only carries progress lines and the report.
fn init_logging(filter: EnvFilter) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
