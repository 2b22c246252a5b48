use std::time::Duration;
use thiserror::Error;

/// Custom error type for decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("hex decode failed: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("could not read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid address '{input}': expected 20 bytes, got {len}")]
    AddressLength { input: String, len: usize },

    #[error("invalid nonce '{0}'")]
    Nonce(String),
}

/// Error type for account classification inputs.
///
/// The classifier itself is total; this is only raised when malformed facts are
/// handed to the account layer as text.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] DecodeError),
}

/// Errors raised by a state provider while fetching account facts.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("failed to fetch {what} for {address}: {reason}")]
    Fetch {
        what: &'static str,
        address: String,
        reason: String,
    },
    #[error("lookup for {address} timed out after {limit:?}")]
    Timeout { address: String, limit: Duration },
    #[error("invalid state snapshot: {0}")]
    Snapshot(String),
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid address in field '{field}': {source}")]
    InvalidAddress {
        field: &'static str,
        #[source]
        source: DecodeError,
    },
    #[error("invalid value: {0}")]
    Invalid(String),
}
