//! Cryptographic primitives for CREATE2 address derivation.
//!
//! - salt-independent: `init_code_hash = keccak256(bytecode || constructorArgs)`
//! - per attempt: `address = keccak256(0xff || deployer || salt || initCodeHash)[12..32]`

mod address;
pub mod create2;
mod salt;

pub use address::{Address, HexError};
pub use create2::{create2_address, init_code_hash, DEFAULT_DEPLOYER};
pub use salt::Salt;

use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 of arbitrary bytes (output 32 bytes).
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(input);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Decodes a hex string with or without a leading `0x` into exactly `N` bytes.
pub fn decode_fixed<const N: usize>(input: &str) -> Result<[u8; N], HexError> {
    let bytes = decode_bytes(input)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| HexError::Length {
        expected: N,
        actual: len,
    })
}

/// Decodes a hex string of any even length, with or without a leading `0x`.
pub fn decode_bytes(input: &str) -> Result<Vec<u8>, HexError> {
    let trimmed = input.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    Ok(hex::decode(stripped)?)
}
