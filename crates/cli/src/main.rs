/// Entry point for the govscan CLI, a governance proposal address vetting tool.
///
/// This module parses command-line arguments and dispatches to subcommands for scanning raw
/// bytecode, classifying a single account, or running the selfdestruct checks of a proposal
/// against a state snapshot. It initializes logging and handles the main execution flow.
use clap::Parser;
use govscan_cli::commands::{Cmd, Command};
use tracing_subscriber::EnvFilter;

/// Command-line interface for govscan.
///
/// govscan flags contracts that can selfdestruct or DELEGATECALL into arbitrary logic, so a DAO
/// can vet every address a proposal calls before voting on it.
#[derive(Parser)]
#[command(name = "govscan")]
#[command(about = "govscan: selfdestruct and delegatecall vetting for governance proposals")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the govscan CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.command.execute().await
}
