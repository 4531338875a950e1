use std::cmp::Ordering;

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::error::{CodecError, CodecResult};
use crate::search::binary_search_with_hint;
use crate::traits::Codec;

/// Fixed per-object overhead charged to every string.
pub const STRING_BASE_MEMORY: usize = 24;

/// Memory charged per UTF-16 code unit of a string.
pub const STRING_CHAR_MEMORY: usize = 2;

/// Codec for `i64`: 8 bytes, big-endian, natural order.
#[derive(Clone, Copy, Debug, Default)]
pub struct LongCodec;

impl LongCodec {
    pub const NAME: &'static str = "long";
    pub const BYTES: usize = 8;
}

impl Codec for LongCodec {
    type Value = i64;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn estimate_memory(&self, _value: &i64) -> usize {
        Self::BYTES
    }

    fn supports_memory_estimation(&self) -> bool {
        true
    }

    fn encode(&self, buf: &mut WriteBuffer, value: &i64) -> CodecResult<()> {
        buf.put_i64(*value);
        Ok(())
    }

    fn encode_bulk(&self, buf: &mut WriteBuffer, values: &[i64]) -> CodecResult<()> {
        buf.reserve(values.len() * Self::BYTES);
        for value in values {
            buf.put_i64(*value);
        }
        Ok(())
    }

    fn decode(&self, buf: &mut ReadBuffer<'_>) -> CodecResult<i64> {
        buf.get_i64()
    }

    fn compare(&self, a: &i64, b: &i64) -> CodecResult<Ordering> {
        Ok(a.cmp(b))
    }

    fn binary_search(&self, key: &i64, keys: &[i64], hint: isize) -> CodecResult<isize> {
        Ok(binary_search_with_hint(keys.len(), hint, |i| key.cmp(&keys[i])))
    }
}

/// Codec for strings: var-int byte length followed by the UTF-8 bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8StringCodec;

impl Utf8StringCodec {
    pub const NAME: &'static str = "utf8-string";

    /// `24 + 2 * length`, with the length counted in UTF-16 code units (the
    /// unit the host's memory budget is expressed in).
    pub fn memory_of(value: &str) -> usize {
        STRING_BASE_MEMORY + STRING_CHAR_MEMORY * value.encode_utf16().count()
    }
}

impl Codec for Utf8StringCodec {
    type Value = String;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn estimate_memory(&self, value: &String) -> usize {
        Self::memory_of(value)
    }

    fn supports_memory_estimation(&self) -> bool {
        true
    }

    fn encode(&self, buf: &mut WriteBuffer, value: &String) -> CodecResult<()> {
        buf.put_len(value.len())?.put_bytes(value.as_bytes());
        Ok(())
    }

    fn decode(&self, buf: &mut ReadBuffer<'_>) -> CodecResult<String> {
        let len = buf.get_len()?;
        let bytes = buf.get_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| CodecError::InvalidUtf8(e.to_string()))
    }

    fn compare(&self, a: &String, b: &String) -> CodecResult<Ordering> {
        Ok(a.cmp(b))
    }

    fn binary_search(&self, key: &String, keys: &[String], hint: isize) -> CodecResult<isize> {
        Ok(binary_search_with_hint(keys.len(), hint, |i| {
            key.as_str().cmp(keys[i].as_str())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode_one<C: Codec>(codec: &C, value: &C::Value) -> Vec<u8> {
        let mut buf = WriteBuffer::new();
        codec.encode(&mut buf, value).unwrap();
        buf.into_inner()
    }

    // -----------------------------------------------------------------------
    // LongCodec
    // -----------------------------------------------------------------------

    #[test]
    fn long_roundtrip_extremes() {
        for value in [i64::MIN, -1, 0, 1, i64::MAX] {
            let bytes = encode_one(&LongCodec, &value);
            assert_eq!(bytes.len(), 8);
            assert_eq!(LongCodec.decode(&mut ReadBuffer::new(&bytes)).unwrap(), value);
        }
    }

    #[test]
    fn long_bulk_roundtrip() {
        let values = vec![3i64, -9, 27];
        let mut buf = WriteBuffer::new();
        LongCodec.encode_bulk(&mut buf, &values).unwrap();
        let bytes = buf.into_inner();
        let mut decoded = LongCodec.allocate_array(3);
        LongCodec
            .decode_bulk(&mut ReadBuffer::new(&bytes), &mut decoded, 3)
            .unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn long_search() {
        let keys = [-10i64, 0, 10, 20];
        assert_eq!(LongCodec.binary_search(&10, &keys, 0).unwrap(), 2);
        assert_eq!(LongCodec.binary_search(&5, &keys, 3).unwrap(), -3);
        assert_eq!(LongCodec.binary_search(&-11, &keys, 99).unwrap(), -1);
    }

    // -----------------------------------------------------------------------
    // Utf8StringCodec
    // -----------------------------------------------------------------------

    #[test]
    fn cafe_roundtrip_and_memory() {
        let value = String::from("café");
        let bytes = encode_one(&Utf8StringCodec, &value);
        // One prefix byte plus five UTF-8 bytes.
        assert_eq!(bytes, vec![5, b'c', b'a', b'f', 0xC3, 0xA9]);
        let decoded = Utf8StringCodec.decode(&mut ReadBuffer::new(&bytes)).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(Utf8StringCodec.estimate_memory(&value), 32);
    }

    #[test]
    fn memory_counts_utf16_units() {
        assert_eq!(Utf8StringCodec::memory_of(""), 24);
        // One supplementary-plane character is two UTF-16 units.
        assert_eq!(Utf8StringCodec::memory_of("🦀"), 28);
    }

    #[test]
    fn long_string_uses_multibyte_prefix() {
        let value = "x".repeat(300);
        let bytes = encode_one(&Utf8StringCodec, &value);
        assert_eq!(&bytes[..2], &[0xAC, 0x02]);
        assert_eq!(bytes.len(), 302);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = Utf8StringCodec
            .decode(&mut ReadBuffer::new(&[2, 0xC3, 0x28]))
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8(_)));
    }

    #[test]
    fn truncated_string_is_rejected() {
        let err = Utf8StringCodec
            .decode(&mut ReadBuffer::new(&[4, b'a']))
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::Truncated {
                needed: 4,
                remaining: 1
            }
        );
    }

    #[test]
    fn string_search() {
        let keys: Vec<String> = ["apple", "banana", "cherry"].map(String::from).to_vec();
        let key = String::from("banana");
        assert_eq!(Utf8StringCodec.binary_search(&key, &keys, 0).unwrap(), 1);
        let missing = String::from("blueberry");
        assert_eq!(Utf8StringCodec.binary_search(&missing, &keys, 2).unwrap(), -3);
    }

    proptest! {
        #[test]
        fn string_roundtrip(value in any::<String>()) {
            let bytes = encode_one(&Utf8StringCodec, &value);
            let mut r = ReadBuffer::new(&bytes);
            prop_assert_eq!(Utf8StringCodec.decode(&mut r).unwrap(), value);
            prop_assert!(r.is_exhausted());
        }

        #[test]
        fn long_bytes_order_for_non_negative(a in 0..i64::MAX, b in 0..i64::MAX) {
            prop_assert_eq!(
                encode_one(&LongCodec, &a).cmp(&encode_one(&LongCodec, &b)),
                LongCodec.compare(&a, &b).unwrap()
            );
        }
    }
}
