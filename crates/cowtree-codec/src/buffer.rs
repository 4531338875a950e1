//! Byte buffers handed to codecs by the store.
//!
//! Wire conventions, fixed for every codec in this crate:
//!
//! - fixed-width integers are big-endian;
//! - var-ints are unsigned LEB128: seven bits per byte, low group first,
//!   high bit set on every byte except the last.

use crate::error::{CodecError, CodecResult};

/// Maximum encoded length of a `u64` var-int.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` as a var-int.
pub fn encode_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode a var-int from the front of `data`. Returns (value, bytes_consumed).
pub fn decode_varint(data: &[u8]) -> CodecResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    for (i, &byte) in data.iter().enumerate() {
        // The tenth byte may only carry the top bit of a u64.
        if shift == 63 && byte > 1 {
            return Err(CodecError::VarIntOverflow { bits: 64 });
        }
        value |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }
    Err(CodecError::TruncatedVarInt)
}

/// Number of bytes `value` occupies as a var-int.
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Growable output buffer a codec appends to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBuffer {
    data: Vec<u8>,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Reserve room for at least `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    pub fn put_i32(&mut self, value: i32) -> &mut Self {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_i64(&mut self, value: i64) -> &mut Self {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_var_u32(&mut self, value: u32) -> &mut Self {
        encode_varint(&mut self.data, u64::from(value));
        self
    }

    pub fn put_var_u64(&mut self, value: u64) -> &mut Self {
        encode_varint(&mut self.data, value);
        self
    }

    /// Write a length as a 32-bit var-int prefix.
    pub fn put_len(&mut self, len: usize) -> CodecResult<&mut Self> {
        let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
        Ok(self.put_var_u32(len))
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// Cursor over encoded bytes a codec reads from.
#[derive(Clone, Debug)]
pub struct ReadBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ReadBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `n` bytes.
    pub fn get_bytes(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(CodecError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn get_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.get_bytes(N)?);
        Ok(out)
    }

    pub fn get_u8(&mut self) -> CodecResult<u8> {
        Ok(self.get_array::<1>()?[0])
    }

    pub fn get_i32(&mut self) -> CodecResult<i32> {
        self.get_array().map(i32::from_be_bytes)
    }

    pub fn get_u32(&mut self) -> CodecResult<u32> {
        self.get_array().map(u32::from_be_bytes)
    }

    pub fn get_i64(&mut self) -> CodecResult<i64> {
        self.get_array().map(i64::from_be_bytes)
    }

    pub fn get_u64(&mut self) -> CodecResult<u64> {
        self.get_array().map(u64::from_be_bytes)
    }

    pub fn get_var_u64(&mut self) -> CodecResult<u64> {
        let (value, consumed) = decode_varint(&self.data[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    pub fn get_var_u32(&mut self) -> CodecResult<u32> {
        let start = self.pos;
        let value = self.get_var_u64()?;
        u32::try_from(value).map_err(|_| {
            self.pos = start;
            CodecError::VarIntOverflow { bits: 32 }
        })
    }

    /// Read a 32-bit var-int length prefix.
    pub fn get_len(&mut self) -> CodecResult<usize> {
        self.get_var_u32().map(|len| len as usize)
    }
}
