//! Dictionary-compressed codecs.
//!
//! Values are written as the var-int code the [`StringEnumerator`] assigns to
//! their string identity, so a repeated string costs one small integer per
//! occurrence instead of its full bytes. Ordering always goes through the
//! string identity: codes follow allocation order, not string order.

use std::cmp::Ordering;
use std::sync::Arc;

use cowtree_types::PersistentSet;

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::capability::{Externalizer, StringEnumerator};
use crate::error::{CodecError, CodecResult};
use crate::search::binary_search_with_hint;
use crate::traits::Codec;

/// Memory charged for one dictionary code.
pub const ENUMERATED_CODE_MEMORY: usize = 4;

/// Fixed memory charged to a set value on top of its codes.
pub const SET_BASE_MEMORY: usize = 24;

fn encode_member<T>(
    buf: &mut WriteBuffer,
    externalizer: &dyn Externalizer<T>,
    enumerator: &dyn StringEnumerator,
    value: &T,
) -> CodecResult<()> {
    let code = enumerator.enumerate(&externalizer.string_id(value))?;
    buf.put_var_u32(code);
    Ok(())
}

fn decode_member<T>(
    buf: &mut ReadBuffer<'_>,
    externalizer: &dyn Externalizer<T>,
    enumerator: &dyn StringEnumerator,
) -> CodecResult<T> {
    let code = buf.get_var_u32()?;
    let string_id = enumerator.value_of(code)?;
    externalizer.create(&string_id)
}

/// Codec storing a value as the dictionary code of its string identity.
pub struct EnumeratedValueCodec<T> {
    externalizer: Arc<dyn Externalizer<T>>,
    enumerator: Arc<dyn StringEnumerator>,
}

impl<T> EnumeratedValueCodec<T> {
    pub const NAME: &'static str = "enumerated-value";

    pub fn new(
        externalizer: Arc<dyn Externalizer<T>>,
        enumerator: Arc<dyn StringEnumerator>,
    ) -> Self {
        Self {
            externalizer,
            enumerator,
        }
    }

    /// Order two values by string identity.
    pub fn compare_values(&self, a: &T, b: &T) -> Ordering {
        self.externalizer
            .string_id(a)
            .cmp(&self.externalizer.string_id(b))
    }
}

impl<T> Clone for EnumeratedValueCodec<T> {
    fn clone(&self) -> Self {
        Self {
            externalizer: Arc::clone(&self.externalizer),
            enumerator: Arc::clone(&self.enumerator),
        }
    }
}

impl<T> std::fmt::Debug for EnumeratedValueCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumeratedValueCodec").finish_non_exhaustive()
    }
}

impl<T> Codec for EnumeratedValueCodec<T> {
    type Value = T;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn estimate_memory(&self, _value: &T) -> usize {
        ENUMERATED_CODE_MEMORY
    }

    fn supports_memory_estimation(&self) -> bool {
        true
    }

    fn encode(&self, buf: &mut WriteBuffer, value: &T) -> CodecResult<()> {
        encode_member(buf, &*self.externalizer, &*self.enumerator, value)
    }

    fn decode(&self, buf: &mut ReadBuffer<'_>) -> CodecResult<T> {
        decode_member(buf, &*self.externalizer, &*self.enumerator)
    }

    fn allocate_array(&self, size: usize) -> Vec<T> {
        self.externalizer.allocate_array(size)
    }

    fn compare(&self, a: &T, b: &T) -> CodecResult<Ordering> {
        Ok(self.compare_values(a, b))
    }

    fn binary_search(&self, key: &T, keys: &[T], hint: isize) -> CodecResult<isize> {
        let key_id = self.externalizer.string_id(key);
        Ok(binary_search_with_hint(keys.len(), hint, |i| {
            key_id.as_ref().cmp(self.externalizer.string_id(&keys[i]).as_ref())
        }))
    }
}

/// Codec for set values: var-int cardinality, then one dictionary code per
/// member. Decodes into a [`PersistentSet`].
///
/// Sets are only ever stored as values, never as keys, so they have no
/// order: `compare` and `binary_search` are unsupported.
pub struct EnumeratedSetCodec<T> {
    externalizer: Arc<dyn Externalizer<T>>,
    enumerator: Arc<dyn StringEnumerator>,
}

impl<T> EnumeratedSetCodec<T> {
    pub const NAME: &'static str = "enumerated-set";

    pub fn new(
        externalizer: Arc<dyn Externalizer<T>>,
        enumerator: Arc<dyn StringEnumerator>,
    ) -> Self {
        Self {
            externalizer,
            enumerator,
        }
    }
}

impl<T> Clone for EnumeratedSetCodec<T> {
    fn clone(&self) -> Self {
        Self {
            externalizer: Arc::clone(&self.externalizer),
            enumerator: Arc::clone(&self.enumerator),
        }
    }
}

impl<T> std::fmt::Debug for EnumeratedSetCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumeratedSetCodec").finish_non_exhaustive()
    }
}

impl<T: Ord + Clone> Codec for EnumeratedSetCodec<T> {
    type Value = PersistentSet<T>;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn estimate_memory(&self, value: &PersistentSet<T>) -> usize {
        SET_BASE_MEMORY + ENUMERATED_CODE_MEMORY * value.len()
    }

    fn supports_memory_estimation(&self) -> bool {
        false
    }

    fn encode(&self, buf: &mut WriteBuffer, value: &PersistentSet<T>) -> CodecResult<()> {
        buf.put_len(value.len())?;
        for member in value {
            encode_member(buf, &*self.externalizer, &*self.enumerator, member)?;
        }
        Ok(())
    }

    fn decode(&self, buf: &mut ReadBuffer<'_>) -> CodecResult<PersistentSet<T>> {
        let len = buf.get_len()?;
        let mut set = PersistentSet::new();
        for _ in 0..len {
            let member = decode_member(buf, &*self.externalizer, &*self.enumerator)?;
            set = set.insert(member);
        }
        Ok(set)
    }

    fn compare(&self, _a: &PersistentSet<T>, _b: &PersistentSet<T>) -> CodecResult<Ordering> {
        Err(CodecError::unsupported(Self::NAME, "compare"))
    }

    fn binary_search(
        &self,
        _key: &PersistentSet<T>,
        _keys: &[PersistentSet<T>],
        _hint: isize,
    ) -> CodecResult<isize> {
        Err(CodecError::unsupported(Self::NAME, "binary_search"))
    }
}
