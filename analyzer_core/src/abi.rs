//! Decoding of `eth_call` results for the ERC-20 metadata getters.
//!
//! A dynamic `string` return value is laid out as three parts:
//!
//! | bytes      | content                                   |
//! |------------|-------------------------------------------|
//! | `0..32`    | offset word (ignored, always `0x20` here) |
//! | `32..64`   | big-endian byte length `n`                |
//! | `64..64+n` | UTF-8 payload, right-padded with zeros    |
//!
//! Results shorter than 64 bytes are treated as a bare payload (some older
//! tokens return `bytes32`). Only printable ASCII survives decoding.

use num_bigint::BigUint;

use crate::SourceError;

/// `name()`
pub const NAME_SELECTOR: &str = "0x06fdde03";
/// `symbol()`
pub const SYMBOL_SELECTOR: &str = "0x95d89b41";
/// `decimals()`
pub const DECIMALS_SELECTOR: &str = "0x313ce567";

const WORD: usize = 32;

fn strip_prefix(hex_data: &str) -> &str {
    let trimmed = hex_data.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Decode an ABI-encoded string return value into printable ASCII
pub fn decode_abi_string(hex_data: &str) -> Result<String, SourceError> {
    let digits = strip_prefix(hex_data);
    if digits.is_empty() {
        return Err(SourceError::NoData("empty call result".to_string()));
    }

    let bytes = hex::decode(digits).map_err(|e| SourceError::Decode(e.to_string()))?;

    let payload: &[u8] = if bytes.len() >= 2 * WORD {
        let length_word = &bytes[WORD..2 * WORD];
        if length_word[..WORD - 8].iter().any(|b| *b != 0) {
            return Err(SourceError::Decode("string length does not fit".to_string()));
        }
        let mut length_bytes = [0u8; 8];
        length_bytes.copy_from_slice(&length_word[WORD - 8..]);
        let length = u64::from_be_bytes(length_bytes) as usize;

        let start = 2 * WORD;
        let end = start.saturating_add(length).min(bytes.len());
        &bytes[start..end]
    } else {
        &bytes
    };

    let decoded: String = payload
        .iter()
        .filter(|b| (32..=126).contains(*b))
        .map(|b| *b as char)
        .collect();
    let decoded = decoded.trim();

    if decoded.is_empty() {
        return Err(SourceError::NoData("no printable characters".to_string()));
    }

    Ok(decoded.to_string())
}

/// Decode a `uint8` return value (any big-endian hex integer that fits)
pub fn decode_uint8(hex_data: &str) -> Result<u8, SourceError> {
    let digits = strip_prefix(hex_data);
    if digits.is_empty() {
        return Err(SourceError::NoData("empty call result".to_string()));
    }

    let value = BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| SourceError::Decode(format!("not a hex integer: {}", hex_data)))?;

    u8::try_from(&value)
        .map_err(|_| SourceError::Decode(format!("value {} does not fit in u8", value)))
}
