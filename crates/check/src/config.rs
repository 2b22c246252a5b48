//! Check configuration and proposal descriptions

use govscan_core::TrustSet;
use govscan_core::decoder::parse_address;
use govscan_utils::errors::ConfigError;
use revm::primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::Path};

/// Controls how the proposal checks talk to the state provider and how results are judged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Upper bound for the code + nonce lookups of a single address
    pub fetch_timeout: Duration,

    /// Maximum number of addresses whose lookups are in flight at once
    pub max_concurrent_lookups: usize,

    /// Treat warnings (empty accounts, DELEGATECALL) as failures
    pub fail_on_warning: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            max_concurrent_lookups: 8,
            fail_on_warning: false,
        }
    }
}

impl CheckConfig {
    /// Short timeouts and sequential lookups, for local snapshots and debugging
    pub fn development() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            max_concurrent_lookups: 1,
            fail_on_warning: false,
        }
    }

    /// Fails the run on any warning
    pub fn strict() -> Self {
        Self {
            fail_on_warning: true,
            ..Self::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "fetch_timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrent_lookups == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_lookups must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// A governance proposal to vet: the DAO's own contracts plus the addresses the proposal calls
/// and, when a simulation was run, the addresses its execution touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalConfig {
    pub dao_name: String,
    pub governor_address: String,
    pub timelock_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<String>,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub touched_addresses: Vec<String>,
    /// additional addresses exempt from inspection
    #[serde(default)]
    pub trusted_addresses: Vec<String>,
}

impl ProposalConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&json)
    }

    /// Checks that every address field parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.governor()?;
        self.timelock()?;
        self.trust_set()?;
        self.target_addresses()?;
        self.touched()?;
        Ok(())
    }

    pub fn governor(&self) -> Result<Address, ConfigError> {
        parse_field("governorAddress", &self.governor_address)
    }

    pub fn timelock(&self) -> Result<Address, ConfigError> {
        parse_field("timelockAddress", &self.timelock_address)
    }

    /// Governor, timelock and any extra trusted addresses.
    pub fn trust_set(&self) -> Result<TrustSet, ConfigError> {
        let mut trusted: TrustSet = [self.governor()?, self.timelock()?].into_iter().collect();
        trusted.extend(parse_list("trustedAddresses", &self.trusted_addresses)?);
        Ok(trusted)
    }

    pub fn target_addresses(&self) -> Result<Vec<Address>, ConfigError> {
        parse_list("targets", &self.targets)
    }

    pub fn touched(&self) -> Result<Vec<Address>, ConfigError> {
        parse_list("touchedAddresses", &self.touched_addresses)
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    parse_address(value).map_err(|source| ConfigError::InvalidAddress { field, source })
}

fn parse_list(field: &'static str, values: &[String]) -> Result<Vec<Address>, ConfigError> {
    values.iter().map(|v| parse_field(field, v)).collect()
}
