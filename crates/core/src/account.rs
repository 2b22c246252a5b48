//! Account classification: combines trust-list membership, account existence facts and the
//! bytecode scan into one risk category per address.

use crate::decoder::{parse_code, parse_nonce};
use crate::scanner::{BytecodeVerdict, classify_bytecode};
use govscan_utils::errors::ClassifyError;
use revm::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Risk category of a single address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    /// Part of the proposal's own governance infrastructure; not inspected.
    Trusted,
    /// Externally-owned account: no code, nonce > 0.
    Eoa,
    /// No code and nonce 0. Code may be deployed here later.
    Empty,
    /// Contract without a reachable `SELFDESTRUCT` or `DELEGATECALL`.
    Safe,
    /// Contract without a reachable `SELFDESTRUCT` but with a reachable `DELEGATECALL`.
    DelegateCall,
    /// Contract with a reachable `SELFDESTRUCT`.
    SelfDestruct,
}

/// Report bucket a category is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl AccountCategory {
    pub const fn severity(&self) -> Severity {
        match self {
            AccountCategory::Trusted | AccountCategory::Eoa | AccountCategory::Safe => {
                Severity::Info
            }
            AccountCategory::Empty | AccountCategory::DelegateCall => Severity::Warning,
            AccountCategory::SelfDestruct => Severity::Error,
        }
    }

    /// Human-readable wording used in check reports.
    pub const fn description(&self) -> &'static str {
        match self {
            AccountCategory::Trusted => "Trusted contract (not checked)",
            AccountCategory::Eoa => "EOA",
            AccountCategory::Empty => "EOA (may have code later)",
            AccountCategory::Safe => "Contract (looks safe)",
            AccountCategory::DelegateCall => "Contract (with DELEGATECALL)",
            AccountCategory::SelfDestruct => "Contract (with SELFDESTRUCT)",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            AccountCategory::Trusted => "trusted",
            AccountCategory::Eoa => "eoa",
            AccountCategory::Empty => "empty",
            AccountCategory::Safe => "safe",
            AccountCategory::DelegateCall => "delegatecall",
            AccountCategory::SelfDestruct => "selfdestruct",
        }
    }
}

impl fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl From<BytecodeVerdict> for AccountCategory {
    fn from(verdict: BytecodeVerdict) -> Self {
        match verdict {
            BytecodeVerdict::Safe => AccountCategory::Safe,
            BytecodeVerdict::DelegateCall => AccountCategory::DelegateCall,
            BytecodeVerdict::SelfDestruct => AccountCategory::SelfDestruct,
        }
    }
}

/// Addresses exempt from code inspection.
///
/// Addresses are stored as raw bytes, so membership is independent of how the hex was cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustSet {
    addresses: HashSet<Address>,
}

impl TrustSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an address, returning `false` if it was already trusted.
    pub fn insert(&mut self, address: Address) -> bool {
        self.addresses.insert(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.contains(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.addresses.iter()
    }
}

impl FromIterator<Address> for TrustSet {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self {
            addresses: iter.into_iter().collect(),
        }
    }
}

impl Extend<Address> for TrustSet {
    fn extend<I: IntoIterator<Item = Address>>(&mut self, iter: I) {
        self.addresses.extend(iter);
    }
}

/// Externally obtained facts about an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFacts {
    /// deployed code; `None` when the code could not be retrieved
    pub code: Option<Vec<u8>>,
    /// transaction count
    pub nonce: u64,
}

impl AccountFacts {
    pub const fn new(code: Option<Vec<u8>>, nonce: u64) -> Self {
        Self { code, nonce }
    }

    /// Builds facts from the textual form a node returns (`eth_getCode`,
    /// `eth_getTransactionCount`).
    ///
    /// Malformed hex or a negative/garbled nonce is rejected instead of being guessed at.
    pub fn from_hex(code: Option<&str>, nonce: &str) -> Result<Self, ClassifyError> {
        let code = code.map(parse_code).transpose()?;
        let nonce = parse_nonce(nonce)?;
        Ok(Self { code, nonce })
    }
}

/// Decides the category of one address.
///
/// The first matching rule wins:
/// 1. trusted address
/// 2. code unavailable -> `Empty`
/// 3. zero-length code -> `Eoa` when the nonce is non-zero, otherwise `Empty`
/// 4. bytecode scan verdict
pub fn classify_account(
    trusted: &TrustSet,
    address: &Address,
    facts: &AccountFacts,
) -> AccountCategory {
    if trusted.contains(address) {
        return AccountCategory::Trusted;
    }

    let category = match facts.code.as_deref() {
        None => AccountCategory::Empty,
        // A contract that selfdestructed has its nonce reset, so nonce > 0 without code is an EOA.
        Some([]) if facts.nonce > 0 => AccountCategory::Eoa,
        Some([]) => AccountCategory::Empty,
        Some(code) => classify_bytecode(code).into(),
    };
    tracing::debug!("{} classified as {}", address, category);
    category
}
