//! Address match criteria.

use std::fmt;

use crate::crypto::Address;

/// Number of hex characters in an address.
pub const ADDRESS_HEX_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    #[error("{which} must contain only hex characters (0-9, a-f), got {value:?}")]
    NotHex { which: &'static str, value: String },
    #[error("combined prefix + suffix is {0} characters, an address only has 40")]
    TooLong(usize),
}

/// Desired prefix and suffix of the lowercase hex form of an address.
///
/// Both fragments are stored lowercase without `0x`. An empty fragment
/// matches every address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    prefix: String,
    suffix: String,
    /// Pre-parsed nibble arrays for zero-allocation matching.
    prefix_nibbles: Vec<u8>,
    suffix_nibbles: Vec<u8>,
}

/// Lowercases and strips a leading `0x`, then checks the charset.
fn normalize(which: &'static str, fragment: &str) -> Result<String, CriteriaError> {
    let lower = fragment.trim().to_lowercase();
    let stripped = lower.strip_prefix("0x").unwrap_or(&lower);
    if !stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CriteriaError::NotHex {
            which,
            value: fragment.to_string(),
        });
    }
    Ok(stripped.to_string())
}

/// Convert a validated lowercase hex string to one nibble (0..15) per char.
fn hex_to_nibbles(hex: &str) -> Vec<u8> {
    hex.bytes()
        .map(|b| match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            _ => unreachable!("validated hex"),
        })
        .collect()
}

/// Convert 20-byte address to 40 nibbles on the stack.
#[inline]
fn addr_to_nibbles(bytes: &[u8; 20]) -> [u8; ADDRESS_HEX_LEN] {
    let mut nibbles = [0u8; ADDRESS_HEX_LEN];
    for (i, byte) in bytes.iter().enumerate() {
        nibbles[i * 2] = byte >> 4;
        nibbles[i * 2 + 1] = byte & 0x0f;
    }
    nibbles
}

impl Criteria {
    /// Builds criteria from user-supplied fragments, failing fast on
    /// non-hex input or a combined length beyond the address width.
    pub fn new(prefix: &str, suffix: &str) -> Result<Self, CriteriaError> {
        let prefix = normalize("prefix", prefix)?;
        let suffix = normalize("suffix", suffix)?;

        let total = prefix.len() + suffix.len();
        if total > ADDRESS_HEX_LEN {
            return Err(CriteriaError::TooLong(total));
        }

        let prefix_nibbles = hex_to_nibbles(&prefix);
        let suffix_nibbles = hex_to_nibbles(&suffix);
        Ok(Self {
            prefix,
            suffix,
            prefix_nibbles,
            suffix_nibbles,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// True if the address starts with the prefix and ends with the suffix.
    #[inline]
    pub fn matches(&self, address: &Address) -> bool {
        let nibbles = addr_to_nibbles(address.as_bytes());
        nibbles[..self.prefix_nibbles.len()] == *self.prefix_nibbles
            && nibbles[ADDRESS_HEX_LEN - self.suffix_nibbles.len()..] == *self.suffix_nibbles
    }

    /// Expected attempts per match: 16^n for n constrained characters.
    pub fn estimated_difficulty(&self) -> u64 {
        let n = self.prefix.len() + self.suffix.len();
        16u64.saturating_pow(n as u32)
    }

    pub fn difficulty_description(&self) -> String {
        match self.estimated_difficulty() {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gap = ADDRESS_HEX_LEN - self.prefix.len() - self.suffix.len();
        write!(f, "0x{}{}{}", self.prefix, "*".repeat(gap), self.suffix)
    }
}
