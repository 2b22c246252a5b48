//! Check results, bucketed the way a proposal reviewer reads them.

use govscan_core::{AccountCategory, Severity};
use revm::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AddressOutcome {
    /// The account was classified.
    Classified { category: AccountCategory },
    /// Looking up code or nonce failed, so nothing can be said about the account.
    Unclassified { reason: String },
}

impl AddressOutcome {
    /// A failed lookup is an error, never a pass.
    pub const fn severity(&self) -> Severity {
        match self {
            AddressOutcome::Classified { category } => category.severity(),
            AddressOutcome::Unclassified { .. } => Severity::Error,
        }
    }

    pub const fn category(&self) -> Option<AccountCategory> {
        match self {
            AddressOutcome::Classified { category } => Some(*category),
            AddressOutcome::Unclassified { .. } => None,
        }
    }
}

/// Outcome for one address, with the address in checksum form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressReport {
    pub address: String,
    #[serde(flatten)]
    pub outcome: AddressOutcome,
}

impl AddressReport {
    pub fn new(address: Address, outcome: AddressOutcome) -> Self {
        Self {
            address: address.to_checksum(None),
            outcome,
        }
    }

    /// Line shown in the report bucket, e.g. `0xAbC...: Contract (looks safe)`.
    pub fn message(&self) -> String {
        match &self.outcome {
            AddressOutcome::Classified { category } => {
                format!("{}: {}", self.address, category.description())
            }
            AddressOutcome::Unclassified { reason } => {
                format!("{}: Unable to classify ({reason})", self.address)
            }
        }
    }
}

/// Result of one proposal check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub name: String,
    pub info: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub addresses: Vec<AddressReport>,
}

impl CheckReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Files an address outcome into the matching bucket.
    pub fn push(&mut self, report: AddressReport) {
        let message = report.message();
        match report.outcome.severity() {
            Severity::Info => self.info.push(message),
            Severity::Warning => self.warnings.push(message),
            Severity::Error => self.errors.push(message),
        }
        self.addresses.push(report);
    }

    /// Highest severity present, `None` for a report without addresses.
    pub fn max_severity(&self) -> Option<Severity> {
        self.addresses.iter().map(|a| a.outcome.severity()).max()
    }

    pub fn passed(&self, fail_on_warning: bool) -> bool {
        self.errors.is_empty() && (!fail_on_warning || self.warnings.is_empty())
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for (label, bucket) in [
            ("errors", &self.errors),
            ("warnings", &self.warnings),
            ("info", &self.info),
        ] {
            if bucket.is_empty() {
                continue;
            }
            writeln!(f, "  {label}:")?;
            for line in bucket {
                writeln!(f, "    - {line}")?;
            }
        }
        Ok(())
    }
}
