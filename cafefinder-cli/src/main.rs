//! CafeFinder CLI - Command-line interface
//!
//! Runs the API server or performs one-shot geocoding and café searches.

mod commands;

use std::path::PathBuf;

use cafefinder_core::tracing_setup::{CliLogLevel, init_tracing};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cafefinder")]
#[command(about = "Find coffee shops near any address")]
#[command(version)]
struct Cli {
    /// Console log level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value_t = CliLogLevel::default(), global = true)]
    log_level: CliLogLevel,

    /// Directory for the full-trace log of the last run
    #[arg(long, default_value = "logs", global = true)]
    logs_dir: PathBuf,

    /// Skip the trace log file
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logs_dir = (!cli.no_log_file).then_some(cli.logs_dir.as_path());
    init_tracing(cli.log_level.as_tracing_level(), logs_dir)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    commands::handle_command(cli.command).await
}
