//! Fixed-width composite key codecs.
//!
//! Keys of these types only ever live in bulk arrays inside a page, so the
//! single-value `encode`/`decode` paths are unsupported. Bulk encoding uses
//! fixed-width writes only, which keeps every key at a known offset.

use std::cmp::Ordering;

use cowtree_types::{IntLongPair, Uint128};

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::error::{CodecError, CodecResult};
use crate::search::binary_search_with_hint;
use crate::traits::Codec;

/// Codec for [`Uint128`] hash keys: most-significant half then
/// least-significant half, 8 bytes each.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uint128KeyCodec;

impl Uint128KeyCodec {
    pub const NAME: &'static str = "uint128-key";

    /// Compare as unsigned 64-bit halves, most-significant first.
    pub fn compare_keys(a: &Uint128, b: &Uint128) -> Ordering {
        a.most_significant()
            .cmp(&b.most_significant())
            .then_with(|| a.least_significant().cmp(&b.least_significant()))
    }
}

impl Codec for Uint128KeyCodec {
    type Value = Uint128;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn estimate_memory(&self, _value: &Uint128) -> usize {
        Uint128::BYTES
    }

    fn supports_memory_estimation(&self) -> bool {
        true
    }

    fn encode(&self, _buf: &mut WriteBuffer, _value: &Uint128) -> CodecResult<()> {
        Err(CodecError::unsupported(Self::NAME, "encode"))
    }

    fn encode_bulk(&self, buf: &mut WriteBuffer, values: &[Uint128]) -> CodecResult<()> {
        buf.reserve(values.len() * Uint128::BYTES);
        for value in values {
            buf.put_u64(value.most_significant())
                .put_u64(value.least_significant());
        }
        Ok(())
    }

    fn decode(&self, _buf: &mut ReadBuffer<'_>) -> CodecResult<Uint128> {
        Err(CodecError::unsupported(Self::NAME, "decode"))
    }

    fn decode_bulk(
        &self,
        buf: &mut ReadBuffer<'_>,
        storage: &mut Vec<Uint128>,
        len: usize,
    ) -> CodecResult<()> {
        storage.reserve(len);
        for _ in 0..len {
            let most = buf.get_u64()?;
            let least = buf.get_u64()?;
            storage.push(Uint128::new(most, least));
        }
        Ok(())
    }

    fn compare(&self, a: &Uint128, b: &Uint128) -> CodecResult<Ordering> {
        Ok(Self::compare_keys(a, b))
    }

    fn binary_search(&self, key: &Uint128, keys: &[Uint128], hint: isize) -> CodecResult<isize> {
        Ok(binary_search_with_hint(keys.len(), hint, |i| {
            Self::compare_keys(key, &keys[i])
        }))
    }
}

/// Codec for [`IntLongPair`] keys: 4-byte int then 8-byte long.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntLongPairKeyCodec;

impl IntLongPairKeyCodec {
    pub const NAME: &'static str = "int-long-pair-key";

    /// Compare `first`, then `second`, both signed.
    pub fn compare_keys(a: &IntLongPair, b: &IntLongPair) -> Ordering {
        a.first()
            .cmp(&b.first())
            .then_with(|| a.second().cmp(&b.second()))
    }
}

impl Codec for IntLongPairKeyCodec {
    type Value = IntLongPair;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn estimate_memory(&self, _value: &IntLongPair) -> usize {
        IntLongPair::BYTES
    }

    fn supports_memory_estimation(&self) -> bool {
        true
    }

    fn encode(&self, _buf: &mut WriteBuffer, _value: &IntLongPair) -> CodecResult<()> {
        Err(CodecError::unsupported(Self::NAME, "encode"))
    }

    fn encode_bulk(&self, buf: &mut WriteBuffer, values: &[IntLongPair]) -> CodecResult<()> {
        buf.reserve(values.len() * IntLongPair::BYTES);
        for value in values {
            buf.put_i32(value.first()).put_i64(value.second());
        }
        Ok(())
    }

    fn decode(&self, _buf: &mut ReadBuffer<'_>) -> CodecResult<IntLongPair> {
        Err(CodecError::unsupported(Self::NAME, "decode"))
    }

    fn decode_bulk(
        &self,
        buf: &mut ReadBuffer<'_>,
        storage: &mut Vec<IntLongPair>,
        len: usize,
    ) -> CodecResult<()> {
        storage.reserve(len);
        for _ in 0..len {
            let first = buf.get_i32()?;
            let second = buf.get_i64()?;
            storage.push(IntLongPair::new(first, second));
        }
        Ok(())
    }

    fn compare(&self, a: &IntLongPair, b: &IntLongPair) -> CodecResult<Ordering> {
        Ok(Self::compare_keys(a, b))
    }

    fn binary_search(
        &self,
        key: &IntLongPair,
        keys: &[IntLongPair],
        hint: isize,
    ) -> CodecResult<isize> {
        Ok(binary_search_with_hint(keys.len(), hint, |i| {
            Self::compare_keys(key, &keys[i])
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode_u128_keys(keys: &[Uint128]) -> Vec<u8> {
        let mut buf = WriteBuffer::new();
        Uint128KeyCodec.encode_bulk(&mut buf, keys).unwrap();
        buf.into_inner()
    }

    fn encode_pair_keys(keys: &[IntLongPair]) -> Vec<u8> {
        let mut buf = WriteBuffer::new();
        IntLongPairKeyCodec.encode_bulk(&mut buf, keys).unwrap();
        buf.into_inner()
    }

    // -----------------------------------------------------------------------
    // Uint128KeyCodec
    // -----------------------------------------------------------------------

    #[test]
    fn uint128_bulk_roundtrip() {
        let keys = vec![
            Uint128::new(0, 3),
            Uint128::new(0, 5),
            Uint128::new(u64::MAX, 0),
        ];
        let bytes = encode_u128_keys(&keys);
        assert_eq!(bytes.len(), 3 * Uint128::BYTES);

        let mut r = ReadBuffer::new(&bytes);
        let mut decoded = Uint128KeyCodec.allocate_array(keys.len());
        Uint128KeyCodec
            .decode_bulk(&mut r, &mut decoded, keys.len())
            .unwrap();
        assert_eq!(decoded, keys);
        assert!(r.is_exhausted());
    }

    #[test]
    fn uint128_layout_is_most_significant_first() {
        let bytes = encode_u128_keys(&[Uint128::new(1, 2)]);
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn uint128_compare_and_search() {
        let five = Uint128::new(0, 5);
        let three = Uint128::new(0, 3);
        assert_eq!(Uint128KeyCodec.compare(&five, &three).unwrap(), Ordering::Greater);

        let sorted = [three, five];
        assert_eq!(Uint128KeyCodec.binary_search(&five, &sorted, 0).unwrap(), 1);
        assert_eq!(Uint128KeyCodec.binary_search(&three, &sorted, 0).unwrap(), 0);
        assert_eq!(
            Uint128KeyCodec
                .binary_search(&Uint128::new(0, 4), &sorted, 0)
                .unwrap(),
            -2
        );
    }

    #[test]
    fn uint128_sign_bit_compares_unsigned() {
        let high = Uint128::new(0x8000_0000_0000_0000, 0);
        let low = Uint128::new(0x7FFF_FFFF_FFFF_FFFF, u64::MAX);
        assert_eq!(Uint128KeyCodec.compare(&high, &low).unwrap(), Ordering::Greater);

        let sorted = [low, high];
        assert_eq!(Uint128KeyCodec.binary_search(&high, &sorted, 0).unwrap(), 1);
    }

    #[test]
    fn uint128_single_value_paths_are_unsupported() {
        let mut buf = WriteBuffer::new();
        let err = Uint128KeyCodec
            .encode(&mut buf, &Uint128::zero())
            .unwrap_err();
        assert!(err.is_unsupported());
        assert!(buf.is_empty());

        let err = Uint128KeyCodec
            .decode(&mut ReadBuffer::new(&[0; 16]))
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::UnsupportedOperation {
                codec: Uint128KeyCodec::NAME,
                operation: "decode"
            }
        );
    }

    #[test]
    fn uint128_memory_is_fixed() {
        assert!(Uint128KeyCodec.supports_memory_estimation());
        assert_eq!(Uint128KeyCodec.estimate_memory(&Uint128::zero()), 16);
    }

    #[test]
    fn uint128_truncated_bulk_decode() {
        let mut decoded = Vec::new();
        let err = Uint128KeyCodec
            .decode_bulk(&mut ReadBuffer::new(&[0; 20]), &mut decoded, 2)
            .unwrap_err();
        assert!(matches!(err, CodecError::Truncated { .. }));
    }

    // -----------------------------------------------------------------------
    // IntLongPairKeyCodec
    // -----------------------------------------------------------------------

    #[test]
    fn pair_bulk_roundtrip() {
        let keys = vec![
            IntLongPair::new(-4, i64::MIN),
            IntLongPair::new(0, 0),
            IntLongPair::new(i32::MAX, 9),
        ];
        let bytes = encode_pair_keys(&keys);
        assert_eq!(bytes.len(), 3 * IntLongPair::BYTES);

        let mut decoded = Vec::new();
        IntLongPairKeyCodec
            .decode_bulk(&mut ReadBuffer::new(&bytes), &mut decoded, 3)
            .unwrap();
        assert_eq!(decoded, keys);
    }

    #[test]
    fn pair_layout_is_int_then_long() {
        let bytes = encode_pair_keys(&[IntLongPair::new(1, 2)]);
        assert_eq!(bytes, vec![0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn pair_single_value_paths_are_unsupported() {
        let mut buf = WriteBuffer::new();
        assert!(IntLongPairKeyCodec
            .encode(&mut buf, &IntLongPair::new(1, 1))
            .unwrap_err()
            .is_unsupported());
        assert!(IntLongPairKeyCodec
            .decode(&mut ReadBuffer::new(&[0; 12]))
            .unwrap_err()
            .is_unsupported());
    }

    #[test]
    fn pair_search_with_hint_one_past_target() {
        let keys: Vec<IntLongPair> = (0..100)
            .map(|i| IntLongPair::new(i / 10, i64::from(i) * 3))
            .collect();
        for target in [0usize, 1, 37, 63, 98, 99] {
            let key = keys[target];
            let hint = target as isize + 2;
            assert_eq!(
                IntLongPairKeyCodec.binary_search(&key, &keys, hint).unwrap(),
                target as isize,
                "target {target}"
            );
        }
    }

    #[test]
    fn pair_memory_is_fixed() {
        assert!(IntLongPairKeyCodec.supports_memory_estimation());
        assert_eq!(IntLongPairKeyCodec.estimate_memory(&IntLongPair::new(0, 0)), 12);
    }

    proptest! {
        #[test]
        fn uint128_compare_is_antisymmetric(a: u128, b: u128) {
            let (a, b) = (Uint128::from(a), Uint128::from(b));
            let ab = Uint128KeyCodec.compare(&a, &b).unwrap();
            let ba = Uint128KeyCodec.compare(&b, &a).unwrap();
            prop_assert_eq!(ab, ba.reverse());
            prop_assert_eq!(Uint128KeyCodec.compare(&a, &a).unwrap(), Ordering::Equal);
        }

        #[test]
        fn uint128_bytes_order_like_keys(
            am in any::<u64>(), al in any::<u64>(),
            bm in any::<u64>(), bl in any::<u64>(),
        ) {
            let (a, b) = (Uint128::new(am, al), Uint128::new(bm, bl));
            prop_assert_eq!(
                encode_u128_keys(&[a]).cmp(&encode_u128_keys(&[b])),
                Uint128KeyCodec.compare(&a, &b).unwrap()
            );
        }

        #[test]
        fn pair_bytes_order_like_keys(
            af in 0..i32::MAX, as_ in 0..i64::MAX,
            bf in 0..i32::MAX, bs in 0..i64::MAX,
        ) {
            let (a, b) = (IntLongPair::new(af, as_), IntLongPair::new(bf, bs));
            prop_assert_eq!(
                encode_pair_keys(&[a]).cmp(&encode_pair_keys(&[b])),
                IntLongPairKeyCodec.compare(&a, &b).unwrap()
            );
        }

        #[test]
        fn pair_compare_is_antisymmetric(af: i32, as_: i64, bf: i32, bs: i64) {
            let (a, b) = (IntLongPair::new(af, as_), IntLongPair::new(bf, bs));
            prop_assert_eq!(
                IntLongPairKeyCodec.compare(&a, &b).unwrap(),
                IntLongPairKeyCodec.compare(&b, &a).unwrap().reverse()
            );
        }

        #[test]
        fn uint128_search_matches_linear_scan(
            raw in proptest::collection::btree_set(any::<u64>(), 0..64),
            probe: u64,
            hint in -3isize..70,
        ) {
            // Spread values across the sign bit of the most-significant half.
            let keys: Vec<Uint128> = raw.iter().map(|&v| Uint128::new(v, !v)).collect();
            let key = Uint128::new(probe, !probe);
            let expected = match keys.iter().position(|k| *k >= key) {
                Some(i) if keys[i] == key => i as isize,
                Some(i) => -(i as isize) - 1,
                None => -(keys.len() as isize) - 1,
            };
            prop_assert_eq!(Uint128KeyCodec.binary_search(&key, &keys, hint).unwrap(), expected);
        }
    }
}
