//! govscan's single entry-point for turning user or node supplied text into raw account facts.
//!
//! Everything that reaches the classifier passes through here first, so malformed hex, short
//! addresses and negative nonces are rejected before any classification happens.

use govscan_utils::errors::DecodeError;
use hex::FromHex;
use revm::primitives::Address;
use std::{fs, path::Path};

/// Normalizes hex strings by removing whitespace and the 0x prefix.
///
/// Odd-length input is rejected rather than padded: a missing nibble shifts every byte after it.
pub fn normalize_hex_string(input: &str) -> Result<String, DecodeError> {
    let compact = input.trim().replace(['\n', '\r', ' ', '\t'], "");
    let clean = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);

    // Validate hex characters
    if let Some((index, c)) = clean.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(DecodeError::HexDecode(
            hex::FromHexError::InvalidHexCharacter { c, index },
        ));
    }

    if clean.len() % 2 == 1 {
        return Err(DecodeError::HexDecode(hex::FromHexError::OddLength));
    }
    Ok(clean.to_string())
}

/// Normalizes input into a byte vector from hex string or hex file.
pub fn input_to_bytes(input: &str, is_file: bool) -> Result<Vec<u8>, DecodeError> {
    if is_file {
        let path = Path::new(input);
        let file_content = fs::read_to_string(path).map_err(|e| DecodeError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        parse_code(&file_content)
    } else {
        parse_code(input)
    }
}

/// Decodes deployed bytecode as returned by a node's `eth_getCode`.
///
/// `"0x"` (and the empty string) decode to zero-length code, the canonical "no bytecode" value.
pub fn parse_code(input: &str) -> Result<Vec<u8>, DecodeError> {
    let normalized = normalize_hex_string(input)?;
    Vec::from_hex(&normalized).map_err(DecodeError::HexDecode)
}

/// Parses a 20-byte address in any letter case.
///
/// Checksums are not enforced; the result is raw bytes, so two spellings of the same address
/// compare equal.
pub fn parse_address(input: &str) -> Result<Address, DecodeError> {
    let trimmed = input.trim();
    let clean = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = Vec::from_hex(clean)?;
    if bytes.len() != 20 {
        return Err(DecodeError::AddressLength {
            input: input.to_string(),
            len: bytes.len(),
        });
    }
    Ok(Address::from_slice(&bytes))
}

/// Parses a transaction count given as a decimal number or a `0x` hex quantity.
pub fn parse_nonce(input: &str) -> Result<u64, DecodeError> {
    let trimmed = input.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some("") => Ok(0),
        Some(hex_digits) => u64::from_str_radix(hex_digits, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|_| DecodeError::Nonce(input.to_string()))
}
