use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// 128-bit hash key made of two unsigned 64-bit halves.
///
/// Ordering is lexicographic on `(most, least)` and both halves compare as
/// unsigned quantities, so the order matches the numeric order of the full
/// 128-bit value. Values with the sign bit set in either half sort *after*
/// values without it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Uint128 {
    most: u64,
    least: u64,
}

impl Uint128 {
    /// Encoded width in bytes.
    pub const BYTES: usize = 16;

    /// Create a key from its most- and least-significant halves.
    pub const fn new(most: u64, least: u64) -> Self {
        Self { most, least }
    }

    /// The all-zero key.
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Hash arbitrary bytes into a key (first 16 bytes of a BLAKE3 digest).
    pub fn from_hash_of(data: &[u8]) -> Self {
        let digest = blake3::hash(data);
        let mut bytes = [0u8; Self::BYTES];
        bytes.copy_from_slice(&digest.as_bytes()[..Self::BYTES]);
        Self::from_be_bytes(bytes)
    }

    /// The most-significant half.
    pub const fn most_significant(&self) -> u64 {
        self.most
    }

    /// The least-significant half.
    pub const fn least_significant(&self) -> u64 {
        self.least
    }

    /// Big-endian byte form: most-significant half first.
    pub fn to_be_bytes(&self) -> [u8; Self::BYTES] {
        let mut out = [0u8; Self::BYTES];
        out[..8].copy_from_slice(&self.most.to_be_bytes());
        out[8..].copy_from_slice(&self.least.to_be_bytes());
        out
    }

    /// Inverse of [`Uint128::to_be_bytes`].
    pub fn from_be_bytes(bytes: [u8; Self::BYTES]) -> Self {
        let mut most = [0u8; 8];
        let mut least = [0u8; 8];
        most.copy_from_slice(&bytes[..8]);
        least.copy_from_slice(&bytes[8..]);
        Self::new(u64::from_be_bytes(most), u64::from_be_bytes(least))
    }

    /// Hex-encoded string representation (32 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// Parse from a 32-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let arr: [u8; Self::BYTES] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| TypeError::InvalidLength {
                    expected: Self::BYTES,
                    actual: bytes.len(),
                })?;
        Ok(Self::from_be_bytes(arr))
    }
}

impl fmt::Debug for Uint128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uint128({:016x}:{:016x})", self.most, self.least)
    }
}

impl fmt::Display for Uint128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<u128> for Uint128 {
    fn from(value: u128) -> Self {
        Self::new((value >> 64) as u64, value as u64)
    }
}

impl From<Uint128> for u128 {
    fn from(value: Uint128) -> Self {
        ((value.most as u128) << 64) | value.least as u128
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(Uint128::from_hash_of(b"hello"), Uint128::from_hash_of(b"hello"));
        assert_ne!(Uint128::from_hash_of(b"hello"), Uint128::from_hash_of(b"world"));
    }

    #[test]
    fn halves_are_preserved() {
        let key = Uint128::new(7, 9);
        assert_eq!(key.most_significant(), 7);
        assert_eq!(key.least_significant(), 9);
    }

    #[test]
    fn ordering_on_most_then_least() {
        assert!(Uint128::new(0, 3) < Uint128::new(0, 5));
        assert!(Uint128::new(1, 0) > Uint128::new(0, u64::MAX));
    }

    #[test]
    fn sign_bit_sorts_high() {
        // Signed comparison would put these the other way round.
        assert!(Uint128::new(0x8000_0000_0000_0000, 0) > Uint128::new(1, 0));
        assert!(Uint128::new(0, u64::MAX) > Uint128::new(0, 1));
    }

    #[test]
    fn hex_roundtrip() {
        let key = Uint128::new(0xdead_beef, 0x8000_0000_0000_0001);
        let parsed = Uint128::from_hex(&key.to_hex()).unwrap();
        assert_eq!(parsed, key);
        assert_eq!(key.to_hex().len(), 32);
    }

    #[test]
    fn from_hex_wrong_length() {
        let err = Uint128::from_hex("abcd").unwrap_err();
        assert_eq!(err, TypeError::InvalidLength { expected: 16, actual: 2 });
    }

    #[test]
    fn from_hex_not_hex() {
        assert!(matches!(Uint128::from_hex("zz"), Err(TypeError::InvalidHex(_))));
    }

    #[test]
    fn serde_roundtrip() {
        let key = Uint128::new(u64::MAX, 42);
        let json = serde_json::to_string(&key).unwrap();
        let parsed: Uint128 = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }

    proptest! {
        #[test]
        fn order_matches_u128(a: u128, b: u128) {
            prop_assert_eq!(Uint128::from(a).cmp(&Uint128::from(b)), a.cmp(&b));
        }

        #[test]
        fn byte_order_matches_value_order(a: u128, b: u128) {
            let (ka, kb) = (Uint128::from(a), Uint128::from(b));
            prop_assert_eq!(ka.to_be_bytes().cmp(&kb.to_be_bytes()), ka.cmp(&kb));
        }

        #[test]
        fn u128_conversion_roundtrip(v: u128) {
            prop_assert_eq!(u128::from(Uint128::from(v)), v);
        }
    }
}
