//! Leaf page frame: a sorted key array and its parallel value array encoded
//! with their codecs' bulk operations.
//!
//! Layout:
//! ```text
//! [4 bytes: magic "CTPG"]
//! [4 bytes: version (big-endian u32)]
//! [var-int: entry count]
//! [keys:   key codec bulk encoding]
//! [values: value codec bulk encoding]
//! [4 bytes: CRC32 of everything above (big-endian u32)]
//! ```

use tracing::debug;

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::config::PageConfig;
use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

pub const PAGE_MAGIC: &[u8; 4] = b"CTPG";
pub const PAGE_VERSION: u32 = 1;

const HEADER_LEN: usize = 8;
const TRAILER_LEN: usize = 4;

/// Keys and values read back from a page frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedPage<K, V> {
    pub keys: Vec<K>,
    pub values: Vec<V>,
}

impl<K, V> DecodedPage<K, V> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Encode one leaf page.
pub fn encode_page<KC, VC>(
    key_codec: &KC,
    value_codec: &VC,
    keys: &[KC::Value],
    values: &[VC::Value],
    config: &PageConfig,
) -> CodecResult<Vec<u8>>
where
    KC: Codec + ?Sized,
    VC: Codec + ?Sized,
{
    if keys.len() != values.len() {
        return Err(CodecError::LengthMismatch {
            keys: keys.len(),
            values: values.len(),
        });
    }
    if keys.len() > config.max_entries {
        return Err(CodecError::PageOverflow {
            count: keys.len(),
            max: config.max_entries,
        });
    }

    let mut buf = WriteBuffer::new();
    buf.put_bytes(PAGE_MAGIC).put_u32(PAGE_VERSION);
    buf.put_len(keys.len())?;
    key_codec.encode_bulk(&mut buf, keys)?;
    value_codec.encode_bulk(&mut buf, values)?;
    let crc = crc32fast::hash(buf.as_bytes());
    buf.put_u32(crc);

    debug!(
        entries = keys.len(),
        bytes = buf.len(),
        key_codec = key_codec.name(),
        value_codec = value_codec.name(),
        "page encoded"
    );
    Ok(buf.into_inner())
}

/// Decode one leaf page written by [`encode_page`] with the same codecs.
pub fn decode_page<KC, VC>(
    key_codec: &KC,
    value_codec: &VC,
    data: &[u8],
    config: &PageConfig,
) -> CodecResult<DecodedPage<KC::Value, VC::Value>>
where
    KC: Codec + ?Sized,
    VC: Codec + ?Sized,
{
    if data.len() < HEADER_LEN + 1 + TRAILER_LEN {
        return Err(CodecError::PageCorrupted("page too short".into()));
    }
    if &data[0..4] != PAGE_MAGIC {
        return Err(CodecError::InvalidMagic {
            expected: String::from_utf8_lossy(PAGE_MAGIC).into(),
            actual: String::from_utf8_lossy(&data[0..4]).into(),
        });
    }

    let (body, trailer) = data.split_at(data.len() - TRAILER_LEN);
    if config.verify_checksum {
        let mut expected = [0u8; 4];
        expected.copy_from_slice(trailer);
        let expected = u32::from_be_bytes(expected);
        let computed = crc32fast::hash(body);
        if expected != computed {
            return Err(CodecError::ChecksumMismatch { expected, computed });
        }
    }

    let mut r = ReadBuffer::new(body);
    r.get_bytes(4)?;
    let version = r.get_u32()?;
    if version != PAGE_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    let count = r.get_len()?;
    if count > config.max_entries {
        return Err(CodecError::PageCorrupted(format!(
            "entry count {count} exceeds limit {}",
            config.max_entries
        )));
    }

    let mut keys = key_codec.allocate_array(count);
    key_codec.decode_bulk(&mut r, &mut keys, count)?;
    let mut values = value_codec.allocate_array(count);
    value_codec.decode_bulk(&mut r, &mut values, count)?;
    if !r.is_exhausted() {
        return Err(CodecError::PageCorrupted(format!(
            "{} trailing bytes after entries",
            r.remaining()
        )));
    }

    debug!(entries = count, bytes = data.len(), "page decoded");
    Ok(DecodedPage { keys, values })
}
