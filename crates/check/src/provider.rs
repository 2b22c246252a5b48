//! Account state lookups.
//!
//! The classifier never talks to a node. Whatever resolves code and nonces (a JSON-RPC client,
//! an archive database, a recorded snapshot) implements [`StateProvider`] and is injected into
//! the checker.

use async_trait::async_trait;
use govscan_core::AccountFacts;
use govscan_core::decoder::{parse_address, parse_code, parse_nonce};
use govscan_utils::errors::ProviderError;
use revm::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::{fs, path::Path};

/// Source of deployed code and transaction counts.
///
/// Implementations own their retry and batching strategy; a returned error is reported as
/// "unable to classify" and never downgraded to a safe category.
#[async_trait]
pub trait StateProvider: Send + Sync {
    /// Returns the deployed code of `address`, or `None` when no code is available.
    async fn fetch_code(&self, address: Address) -> Result<Option<Vec<u8>>, ProviderError>;

    /// Returns the transaction count of `address`.
    async fn fetch_nonce(&self, address: Address) -> Result<u64, ProviderError>;
}

/// Offline provider holding a fixed set of account facts.
///
/// Addresses that are not in the snapshot behave like never-used accounts: zero-length code and
/// nonce 0.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    accounts: HashMap<Address, AccountFacts>,
}

/// One account as written in a snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotAccount {
    /// `null` marks code that could not be retrieved; a missing field means no code
    #[serde(default = "no_code")]
    code: Option<String>,
    #[serde(default)]
    nonce: NonceField,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum NonceField {
    Number(u64),
    Text(String),
}

impl Default for NonceField {
    fn default() -> Self {
        NonceField::Number(0)
    }
}

fn no_code() -> Option<String> {
    Some("0x".to_string())
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a snapshot document of the form
    /// `{ "0xAddress": { "code": "0x6080..." | null, "nonce": 1 | "0x1" } }`.
    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        let raw: BTreeMap<String, SnapshotAccount> =
            serde_json::from_str(json).map_err(|e| ProviderError::Snapshot(e.to_string()))?;

        let mut accounts = HashMap::with_capacity(raw.len());
        for (key, entry) in raw {
            let address =
                parse_address(&key).map_err(|e| ProviderError::Snapshot(e.to_string()))?;
            let code = entry
                .code
                .as_deref()
                .map(parse_code)
                .transpose()
                .map_err(|e| ProviderError::Snapshot(format!("{key}: {e}")))?;
            let nonce = match entry.nonce {
                NonceField::Number(n) => n,
                NonceField::Text(text) => parse_nonce(&text)
                    .map_err(|e| ProviderError::Snapshot(format!("{key}: {e}")))?,
            };
            if accounts.insert(address, AccountFacts::new(code, nonce)).is_some() {
                return Err(ProviderError::Snapshot(format!(
                    "duplicate entry for {}",
                    address.to_checksum(None)
                )));
            }
        }

        tracing::debug!("loaded state snapshot with {} accounts", accounts.len());
        Ok(Self { accounts })
    }

    /// Reads a snapshot document from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ProviderError::Snapshot(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Adds or replaces an account, builder style.
    pub fn with_account(mut self, address: Address, facts: AccountFacts) -> Self {
        self.insert(address, facts);
        self
    }

    pub fn insert(&mut self, address: Address, facts: AccountFacts) -> Option<AccountFacts> {
        self.accounts.insert(address, facts)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl StateProvider for StateSnapshot {
    async fn fetch_code(&self, address: Address) -> Result<Option<Vec<u8>>, ProviderError> {
        Ok(self
            .accounts
            .get(&address)
            .map_or_else(|| Some(Vec::new()), |facts| facts.code.clone()))
    }

    async fn fetch_nonce(&self, address: Address) -> Result<u64, ProviderError> {
        Ok(self.accounts.get(&address).map_or(0, |facts| facts.nonce))
    }
}
