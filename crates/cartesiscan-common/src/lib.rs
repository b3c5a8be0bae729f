//! Common utilities for CartesiScan token metadata
//!
//! Provides token id conversions, the on-chain token URI reader, and the
//! helpers used to decode metadata that does not live behind HTTP.

pub mod data_uri;
pub mod json;
pub mod token_uri;

use anyhow::Result;
use primitive_types::U256;

pub use token_uri::{JsonRpcUriReader, TokenStandard, TokenUriReader};

// ===== Token id conversions =====

/// Parse a token id from its decimal or `0x`-prefixed hex representation.
///
/// Token ids are 256-bit unsigned integers, so anything that does not fit
/// into a `U256` is rejected rather than truncated.
pub fn parse_token_id(input: &str) -> Result<U256> {
    let input = input.trim();
    if input.is_empty() {
        anyhow::bail!("Empty token id");
    }
    if let Some(hex) = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        if hex.is_empty() || hex.len() > 64 {
            anyhow::bail!("Invalid hex token id {input}");
        }
        return U256::from_str_radix(hex, 16)
            .map_err(|e| anyhow::anyhow!("Invalid hex token id {input}: {e:?}"));
    }

    U256::from_dec_str(input).map_err(|e| anyhow::anyhow!("Invalid token id {input}: {e:?}"))
}

/// Convert U256 to a 32-byte ABI word (big-endian)
pub fn u256_to_word(value: U256) -> [u8; 32] {
    value.to_big_endian()
}

/// Convert an ABI word (or shorter big-endian slice) back to U256
pub fn word_to_u256(bytes: &[u8]) -> U256 {
    let mut arr = [0u8; 32];
    let len = bytes.len().min(32);
    // Right-align for big-endian (pad zeros on the left)
    arr[32 - len..].copy_from_slice(&bytes[bytes.len() - len..]);
    U256::from_big_endian(&arr)
}
