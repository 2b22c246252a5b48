/// Module for the `scan` subcommand, which runs the selfdestruct / delegatecall scan over raw
/// bytecode.
use async_trait::async_trait;
use clap::Args;
use govscan_core::scanner::{code_hash, scan_bytecode};
use std::error::Error;

/// Arguments for the `scan` subcommand.
#[derive(Args)]
pub struct ScanArgs {
    /// Bytecode as hex (0x...) or @file
    input: String,
    /// Print the scan report as JSON
    #[arg(long)]
    json: bool,
}

/// Executes the `scan` subcommand and prints the verdict with the offending program counters.
#[async_trait]
impl super::Command for ScanArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let bytes = super::read_code_arg(&self.input)?;
        if bytes.is_empty() {
            tracing::warn!("input holds no bytecode; an account without code is not a contract");
        }

        let report = scan_bytecode(&bytes);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("verdict:      {}", report.verdict);
        println!("code length:  {} bytes", report.code_len);
        println!("code hash:    0x{}", hex::encode(code_hash(&bytes)));
        println!("instructions: {}", report.instructions_scanned);
        if let Some(pc) = report.selfdestruct_pc {
            println!("SELFDESTRUCT at {pc:#06x}");
        }
        for pc in &report.delegatecall_pcs {
            println!("DELEGATECALL at {pc:#06x}");
        }
        if report.truncated_push {
            println!("note: final PUSH runs past the end of the code");
        }
        Ok(())
    }
}
