//! Cotejar CLI - side-by-side LLM endpoint benchmarking
//!
//! # Commands
//!
//! - `run` - Run the benchmark suite against every configured endpoint
//! - `list` - Show configured endpoints and test cases without calling anyone

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use cotejar::{
    error::Result, print_summary, summarize, BenchClient, BenchmarkRunner, SuiteConfig,
    SuiteReport,
};

/// Cotejar - side-by-side benchmarking for OpenAI-compatible endpoints
///
/// Sends an identical prompt suite to every configured endpoint, measures
/// latency and throughput, and writes a JSON results artifact.
#[derive(Parser)]
#[command(name = "cotejar")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark suite
    ///
    /// Examples:
    ///   cotejar run
    ///   cotejar run --config bench.json --output tonight.json
    Run {
        /// Path to the JSON suite configuration
        #[arg(short, long, env = "COTEJAR_CONFIG", default_value = "benchmark.json")]
        config: PathBuf,

        /// Results artifact path (overrides the config's `output`)
        #[arg(short, long)]
        output: Option<String>,

        /// Seconds between test cases (overrides the config's `pacing_secs`)
        #[arg(long)]
        pacing: Option<u64>,
    },
    /// List configured endpoints and test cases without issuing any calls
    List {
        /// Path to the JSON suite configuration
        #[arg(short, long, env = "COTEJAR_CONFIG", default_value = "benchmark.json")]
        config: PathBuf,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Endpoint calls within a test case multiplex on one logical thread; the
// current-thread runtime is all the concurrency this tool needs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            output,
            pacing,
        } => run_suite(&config, output, pacing).await,
        Commands::List { config } => list_suite(&config),
    }
}

/// Run the full suite and persist the results artifact
async fn run_suite(
    config_path: &Path,
    output: Option<String>,
    pacing: Option<u64>,
) -> Result<()> {
    let mut config = SuiteConfig::load(config_path)?;
    if let Some(output) = output {
        config.output = output;
    }
    if let Some(pacing) = pacing {
        config.pacing_secs = pacing;
    }

    println!("Benchmark configuration:");
    for endpoint in &config.endpoints {
        println!(
            "  Endpoint: {} ({} @ {})",
            endpoint.name, endpoint.model_name, endpoint.base_url
        );
    }
    println!("  Test cases: {}", config.tests.len());
    println!("  Output: {}", config.output);
    println!();

    let mut runner = BenchmarkRunner::new(BenchClient::new(), config.endpoints.clone())
        .with_pacing(Duration::from_secs(config.pacing_secs));
    runner.run_all(&config.tests).await;

    let summaries = summarize(runner.results());
    print_summary(&summaries);

    SuiteReport::from_records(runner.results()).save(Path::new(&config.output))?;
    println!();
    println!("Results saved to {}", config.output);
    Ok(())
}

/// Print the configured endpoints and test suite
fn list_suite(config_path: &Path) -> Result<()> {
    let config = SuiteConfig::load(config_path)?;

    println!("Endpoints:");
    for endpoint in &config.endpoints {
        let auth = if endpoint.requires_auth() {
            "bearer auth"
        } else {
            "no auth"
        };
        println!(
            "  {:<16} {} ({}, {auth})",
            endpoint.name, endpoint.base_url, endpoint.model_name
        );
    }

    println!();
    println!("Test cases:");
    for test in &config.tests {
        println!(
            "  {:<24} - {} (~{} tokens expected, cap {}, temp {})",
            test.name, test.description, test.expected_tokens, test.max_tokens, test.temperature
        );
    }
    Ok(())
}
