//! govscan proposal checks
//!
//! This crate vets every address a governance proposal touches before it is voted on or
//! executed:
//!
//! 1. **State lookups**: code and nonce per address through an injected [`StateProvider`]
//! 2. **Classification**: the bytecode scan and account rules from `govscan-core`
//! 3. **Reporting**: info / warning / error buckets per check

pub mod config;
pub mod orchestrator;
pub mod provider;
pub mod report;

pub use config::{CheckConfig, ProposalConfig};
pub use orchestrator::{ProposalCheck, SelfdestructChecker};
pub use provider::{StateProvider, StateSnapshot};
pub use report::{AddressOutcome, AddressReport, CheckReport};

use govscan_utils::errors::{ConfigError, ProviderError};

/// Main error type for check runs
///
/// Per-address lookup failures do not abort a run; they are reported as unclassified addresses.
#[derive(thiserror::Error, Debug)]
pub enum CheckError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("lookup task failed: {0}")]
    Task(String),
}

/// Result type for check operations
pub type CheckResult<T> = Result<T, CheckError>;
