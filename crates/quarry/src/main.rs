//! Quarry CLI - plan and inspect rate-aware search batches.
//!
//! Quarry runs batches of remote searches with bounded retries, classified
//! backoff and complexity-based pacing between searches. The CLI exposes the
//! configuration and a dry-run planner for batch files.
//!
//! # Usage
//!
//! ```bash
//! # Show how a batch file would be paced
//! quarry plan searches.toml
//!
//! # Same, as JSON
//! quarry plan searches.toml --json
//!
//! # View configuration
//! quarry config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Quarry - rate-aware search batch orchestration.
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show complexity and pacing for each search in a batch file
    Plan(cli::plan::PlanArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match quarry_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `quarry config path`."
            );
            quarry_core::Config::default()
        }
    };
    logging::init(&config.logging, cli.verbose, cli.json_logs);

    tracing::debug!("Quarry v{}", quarry_core::VERSION);

    match cli.command {
        Commands::Plan(args) => cli::plan::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
