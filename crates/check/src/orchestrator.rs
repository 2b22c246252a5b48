//! Proposal checks: fetch facts for every address a proposal touches, classify them and bucket
//! the results.

use crate::{
    CheckError, CheckResult,
    config::{CheckConfig, ProposalConfig},
    provider::StateProvider,
    report::{AddressOutcome, AddressReport, CheckReport},
};
use govscan_core::{AccountFacts, TrustSet, classify_account};
use govscan_utils::errors::ProviderError;
use revm::primitives::Address;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The two selfdestruct checks run against a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProposalCheck {
    /// Every address the proposal calls directly.
    Targets,
    /// Every address the simulated execution touched.
    TouchedContracts,
}

impl ProposalCheck {
    pub const ALL: [ProposalCheck; 2] = [ProposalCheck::Targets, ProposalCheck::TouchedContracts];

    pub const fn name(&self) -> &'static str {
        match self {
            ProposalCheck::Targets => "Check all targets do not contain selfdestruct",
            ProposalCheck::TouchedContracts => {
                "Check all touched contracts do not contain selfdestruct"
            }
        }
    }

    /// Addresses this check inspects.
    pub fn addresses(&self, proposal: &ProposalConfig) -> CheckResult<Vec<Address>> {
        let addresses = match self {
            ProposalCheck::Targets => proposal.target_addresses()?,
            ProposalCheck::TouchedContracts => proposal.touched()?,
        };
        Ok(addresses)
    }
}

/// Runs the selfdestruct checks against an injected state provider.
pub struct SelfdestructChecker {
    config: CheckConfig,
    provider: Arc<dyn StateProvider>,
}

impl std::fmt::Debug for SelfdestructChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelfdestructChecker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SelfdestructChecker {
    pub fn new(config: CheckConfig, provider: Arc<dyn StateProvider>) -> CheckResult<Self> {
        config.validate()?;
        Ok(Self { config, provider })
    }

    pub const fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Runs one check for a proposal.
    pub async fn run(
        &self,
        check: ProposalCheck,
        proposal: &ProposalConfig,
    ) -> CheckResult<CheckReport> {
        let trusted = proposal.trust_set()?;
        let addresses = check.addresses(proposal)?;
        info!(
            "{} for {}: {} addresses, {} trusted",
            check.name(),
            proposal.dao_name,
            addresses.len(),
            trusted.len()
        );
        self.check_addresses(check.name(), &trusted, &addresses).await
    }

    /// Runs every check for a proposal, in [`ProposalCheck::ALL`] order.
    pub async fn run_all(&self, proposal: &ProposalConfig) -> CheckResult<Vec<CheckReport>> {
        let mut reports = Vec::with_capacity(ProposalCheck::ALL.len());
        for check in ProposalCheck::ALL {
            reports.push(self.run(check, proposal).await?);
        }
        Ok(reports)
    }

    /// Classifies a list of addresses and buckets the results.
    ///
    /// Duplicates are dropped (first occurrence wins) and the report keeps input order. Trusted
    /// addresses are never looked up. Lookups for the remaining addresses are fanned out, at most
    /// `max_concurrent_lookups` at a time, with code and nonce fetched concurrently per address.
    pub async fn check_addresses(
        &self,
        name: &str,
        trusted: &TrustSet,
        addresses: &[Address],
    ) -> CheckResult<CheckReport> {
        let unique = dedup(addresses);
        let mut outcomes: Vec<Option<AddressOutcome>> = vec![None; unique.len()];

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_lookups));
        let mut lookups = JoinSet::new();
        for (index, &address) in unique.iter().enumerate() {
            if trusted.contains(&address) {
                let category = classify_account(trusted, &address, &AccountFacts::default());
                outcomes[index] = Some(AddressOutcome::Classified { category });
                continue;
            }

            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let limit = self.config.fetch_timeout;
            lookups.spawn(async move {
                let facts = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetch_facts(provider.as_ref(), address, limit).await,
                    Err(e) => Err(ProviderError::Fetch {
                        what: "permit",
                        address: address.to_checksum(None),
                        reason: e.to_string(),
                    }),
                };
                (index, facts)
            });
        }

        while let Some(joined) = lookups.join_next().await {
            let (index, facts) = joined.map_err(|e| CheckError::Task(e.to_string()))?;
            let address = unique[index];
            let outcome = match facts {
                Ok(facts) => AddressOutcome::Classified {
                    category: classify_account(trusted, &address, &facts),
                },
                Err(e) => {
                    warn!("could not classify {}: {}", address, e);
                    AddressOutcome::Unclassified {
                        reason: e.to_string(),
                    }
                }
            };
            outcomes[index] = Some(outcome);
        }

        let mut report = CheckReport::new(name);
        for (address, outcome) in unique.into_iter().zip(outcomes) {
            let outcome = outcome
                .ok_or_else(|| CheckError::Task(format!("no lookup result for {address}")))?;
            report.push(AddressReport::new(address, outcome));
        }

        info!(
            "{}: {} info, {} warnings, {} errors",
            report.name,
            report.info.len(),
            report.warnings.len(),
            report.errors.len()
        );
        Ok(report)
    }
}

/// Fetches code and nonce for one address concurrently, bounded by `limit`.
async fn fetch_facts(
    provider: &dyn StateProvider,
    address: Address,
    limit: Duration,
) -> Result<AccountFacts, ProviderError> {
    let lookups = async {
        tokio::try_join!(provider.fetch_code(address), provider.fetch_nonce(address))
    };

    match timeout(limit, lookups).await {
        Ok(Ok((code, nonce))) => {
            debug!(
                "{}: {} code bytes, nonce {}",
                address,
                code.as_ref().map_or(0, Vec::len),
                nonce
            );
            Ok(AccountFacts::new(code, nonce))
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ProviderError::Timeout {
            address: address.to_checksum(None),
            limit,
        }),
    }
}

fn dedup(addresses: &[Address]) -> Vec<Address> {
    let mut seen = HashSet::with_capacity(addresses.len());
    addresses
        .iter()
        .copied()
        .filter(|address| seen.insert(*address))
        .collect()
}
