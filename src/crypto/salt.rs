//! 256-bit CREATE2 salts.

use std::fmt;
use std::str::FromStr;

use super::{decode_fixed, keccak256, HexError};

/// A CREATE2 salt, stored as a 32-byte big-endian unsigned integer.
///
/// Arithmetic wraps modulo 2^256. Byte-wise ordering of the big-endian
/// representation matches numeric ordering, so `Ord` is derived.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Salt([u8; 32]);

impl Salt {
    pub const ZERO: Salt = Salt([0u8; 32]);

    #[inline]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Seed offset for a human-readable label: keccak256 of its UTF-8 bytes,
    /// read as a big-endian integer.
    pub fn from_label(label: &str) -> Self {
        Self(keccak256(label.as_bytes()))
    }

    /// Adds `rhs`, wrapping at 2^256.
    #[must_use]
    pub fn wrapping_add_u64(&self, rhs: u64) -> Self {
        let mut out = self.0;
        let mut carry = rhs as u128;
        for byte in out.iter_mut().rev() {
            if carry == 0 {
                break;
            }
            let sum = *byte as u128 + (carry & 0xff);
            *byte = sum as u8;
            carry = (carry >> 8) + (sum >> 8);
        }
        Self(out)
    }

    /// Increments in place as a 256-bit big-endian counter (with wrapping).
    #[inline]
    pub fn increment(&mut self) {
        for byte in self.0.iter_mut().rev() {
            let (val, overflow) = byte.overflowing_add(1);
            *byte = val;
            if !overflow {
                return;
            }
        }
    }

    /// Hex without 0x, always 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// Decimal representation, for tools that take the salt as a uint256.
    pub fn to_decimal(&self) -> String {
        let Some(start) = self.0.iter().position(|&b| b != 0) else {
            return "0".to_string();
        };

        // decimal digits, least significant first
        let mut digits: Vec<u8> = vec![0];
        for &byte in &self.0[start..] {
            let mut carry = byte as u32;
            for d in digits.iter_mut() {
                let val = (*d as u32) * 256 + carry;
                *d = (val % 10) as u8;
                carry = val / 10;
            }
            while carry > 0 {
                digits.push((carry % 10) as u8);
                carry /= 10;
            }
        }

        digits.iter().rev().map(|d| (b'0' + d) as char).collect()
    }
}

impl FromStr for Salt {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(Self)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", self.to_hex_prefixed())
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_prefixed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_carries() {
        let mut salt = Salt::from_u64(0xff);
        salt.increment();
        assert_eq!(salt, Salt::from_u64(0x100));

        let mut max = Salt::from_bytes([0xff; 32]);
        max.increment();
        assert_eq!(max, Salt::ZERO);
    }

    #[test]
    fn test_wrapping_add_u64() {
        assert_eq!(Salt::from_u64(1).wrapping_add_u64(41), Salt::from_u64(42));
        assert_eq!(
            Salt::from_u64(u64::MAX).wrapping_add_u64(1).to_hex(),
            "0000000000000000000000000000000000000000000000010000000000000000"
        );
        assert_eq!(
            Salt::from_bytes([0xff; 32]).wrapping_add_u64(2),
            Salt::from_u64(1)
        );
    }

    #[test]
    fn test_add_matches_repeated_increment() {
        let base = Salt::from_label("test-seed");
        let mut stepped = base;
        for _ in 0..1000 {
            stepped.increment();
        }
        assert_eq!(base.wrapping_add_u64(1000), stepped);
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(Salt::from_u64(1) < Salt::from_u64(256));
        assert!(Salt::from_u64(u64::MAX) < Salt::from_u64(u64::MAX).wrapping_add_u64(1));
    }

    #[test]
    fn test_decimal() {
        assert_eq!(Salt::ZERO.to_decimal(), "0");
        assert_eq!(Salt::from_u64(1_000_000).to_decimal(), "1000000");
        assert_eq!(
            Salt::from_bytes([0xff; 32]).to_decimal(),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
    }

    #[test]
    fn test_from_label_is_keccak_of_utf8() {
        assert_eq!(
            Salt::from_label("").to_hex(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_ne!(Salt::from_label("a"), Salt::from_label("b"));
    }

    #[test]
    fn test_parse_roundtrip_display() {
        let salt = Salt::from_u64(0xcafe);
        let parsed: Salt = salt.to_string().parse().unwrap();
        assert_eq!(parsed, salt);
    }
}
