use std::cmp::Ordering;

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::error::CodecResult;
use crate::search::try_binary_search_with_hint;

/// Encode, decode, order and search values of one type inside store pages.
///
/// All implementations must satisfy these invariants:
/// - `decode(encode(x)) == x` for every supported value, and bulk decode of a
///   bulk-encoded slice reproduces it element-wise.
/// - `compare` is a strict total order. For fixed-width keys it agrees with
///   the byte order of the encoding.
/// - Codecs are stateless apart from injected capabilities, so one instance
///   serves every page of every thread.
/// - Encoding only appends to the caller's buffer; a failed call leaves no
///   state behind in the codec.
pub trait Codec: Send + Sync {
    /// The in-memory value type.
    type Value;

    /// Short name used in fault messages and logs.
    fn name(&self) -> &'static str;

    /// Estimated in-memory size of `value` in bytes, used by the host for
    /// cache and eviction accounting.
    fn estimate_memory(&self, value: &Self::Value) -> usize;

    /// Whether the host may estimate page memory from sampled values.
    fn supports_memory_estimation(&self) -> bool;

    /// Encode a single value.
    fn encode(&self, buf: &mut WriteBuffer, value: &Self::Value) -> CodecResult<()>;

    /// Encode a page's worth of values.
    ///
    /// Default implementation calls `encode()` for each value.
    fn encode_bulk(&self, buf: &mut WriteBuffer, values: &[Self::Value]) -> CodecResult<()> {
        values.iter().try_for_each(|value| self.encode(buf, value))
    }

    /// Decode a single value.
    fn decode(&self, buf: &mut ReadBuffer<'_>) -> CodecResult<Self::Value>;

    /// Decode `len` values, appending them to `storage`.
    ///
    /// Default implementation calls `decode()` `len` times.
    fn decode_bulk(
        &self,
        buf: &mut ReadBuffer<'_>,
        storage: &mut Vec<Self::Value>,
        len: usize,
    ) -> CodecResult<()> {
        storage.reserve(len);
        for _ in 0..len {
            storage.push(self.decode(buf)?);
        }
        Ok(())
    }

    /// Allocate an empty staging array with room for `size` values.
    fn allocate_array(&self, size: usize) -> Vec<Self::Value> {
        Vec::with_capacity(size)
    }

    /// Three-way comparison.
    fn compare(&self, a: &Self::Value, b: &Self::Value) -> CodecResult<Ordering>;

    /// Locate `key` in the sorted `keys` slice, seeding the search with
    /// `hint` (see [`crate::search`]). Returns the index on a hit and
    /// `-(insertion_point) - 1` on a miss.
    fn binary_search(&self, key: &Self::Value, keys: &[Self::Value], hint: isize) -> CodecResult<isize> {
        try_binary_search_with_hint(keys.len(), hint, |i| self.compare(key, &keys[i]))
    }
}
