use async_trait::async_trait;
use clap::Subcommand;
use govscan_core::decoder::{input_to_bytes, parse_code};
use std::error::Error;

pub mod check;
pub mod classify;
pub mod scan;

#[derive(Subcommand)]
pub enum Cmd {
    /// Scan bytecode for reachable SELFDESTRUCT / DELEGATECALL
    Scan(scan::ScanArgs),

    /// Classify one address from its code and nonce
    Classify(classify::ClassifyArgs),

    /// Run the proposal selfdestruct checks against a state snapshot
    Check(check::CheckArgs),
}

#[async_trait]
pub trait Command {
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Scan(args) => args.execute().await,
            Cmd::Classify(args) => args.execute().await,
            Cmd::Check(args) => args.execute().await,
        }
    }
}

/// Reads bytecode given either inline as hex or as `@path` to a hex file.
pub(crate) fn read_code_arg(arg: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let bytes = match arg.strip_prefix('@') {
        Some(path) => input_to_bytes(path, true)?,
        None => parse_code(arg)?,
    };
    Ok(bytes)
}
