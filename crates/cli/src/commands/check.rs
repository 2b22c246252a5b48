/// Module for the `check` subcommand, which runs the selfdestruct checks of a proposal.
///
/// Code and nonces come from a state snapshot file; fetching them from a live node is left to
/// whatever produced the snapshot.
use async_trait::async_trait;
use clap::{Args, ValueEnum};
use govscan_check::{
    CheckConfig, ProposalCheck, ProposalConfig, SelfdestructChecker, StateSnapshot,
};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Which check to run.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CheckKind {
    /// Addresses the proposal calls
    Targets,
    /// Addresses the simulated execution touched
    Touched,
}

impl From<CheckKind> for ProposalCheck {
    fn from(kind: CheckKind) -> Self {
        match kind {
            CheckKind::Targets => ProposalCheck::Targets,
            CheckKind::Touched => ProposalCheck::TouchedContracts,
        }
    }
}

/// Arguments for the `check` subcommand.
#[derive(Args)]
pub struct CheckArgs {
    /// Proposal JSON file
    input: String,
    /// State snapshot JSON mapping addresses to code and nonce
    #[arg(long)]
    state: String,
    /// Run a single check instead of both
    #[arg(long, value_enum)]
    only: Option<CheckKind>,
    /// Print reports as JSON
    #[arg(long)]
    json: bool,
    /// Fail on warnings as well as errors
    #[arg(long)]
    strict: bool,
    /// Per-address lookup timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Maximum number of addresses looked up concurrently
    #[arg(long)]
    concurrency: Option<usize>,
}

impl CheckArgs {
    fn config(&self) -> CheckConfig {
        let mut config = if self.strict {
            CheckConfig::strict()
        } else {
            CheckConfig::default()
        };
        if let Some(secs) = self.timeout {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = self.concurrency {
            config.max_concurrent_lookups = n;
        }
        config
    }
}

/// Executes the `check` subcommand, returning an error when any check fails.
#[async_trait]
impl super::Command for CheckArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let proposal = ProposalConfig::from_file(&self.input)?;
        let snapshot = StateSnapshot::from_file(&self.state)?;
        let config = self.config();
        let fail_on_warning = config.fail_on_warning;
        let checker = SelfdestructChecker::new(config, Arc::new(snapshot))?;

        let reports = match self.only {
            Some(kind) => vec![checker.run(kind.into(), &proposal).await?],
            None => checker.run_all(&proposal).await?,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else {
            for report in &reports {
                print!("{report}");
            }
        }

        let failed = reports
            .iter()
            .filter(|r| !r.passed(fail_on_warning))
            .count();
        if failed > 0 {
            return Err(format!("{failed} of {} checks failed", reports.len()).into());
        }
        Ok(())
    }
}
