//! On-disk codecs for the cowtree copy-on-write B-tree.
//!
//! The store engine calls a [`Codec`] to turn in-memory keys and values into
//! page bytes and back, and to locate keys inside a sorted page. Every key
//! codec shares one hinted binary search ([`search`]), and the enumerated
//! codecs replace repeated strings with dictionary codes.
//!
//! # Codecs
//!
//! - [`Uint128KeyCodec`], [`IntLongPairKeyCodec`]: fixed-width keys, bulk only
//! - [`LongCodec`], [`Utf8StringCodec`]: primitive values
//! - [`EnumeratedValueCodec`], [`EnumeratedSetCodec`]: dictionary-compressed
//!
//! # Capabilities
//!
//! Codecs that need the environment receive it at construction:
//! [`StringEnumerator`] (the dictionary) and [`Externalizer`] (string identity
//! of application values). [`InMemoryStringEnumerator`] and
//! [`StringExternalizer`] are the in-process implementations.
//!
//! # Wire format
//!
//! Fixed-width integers are big-endian and var-ints are unsigned LEB128; see
//! [`buffer`]. [`page`] frames a whole leaf page with a CRC32 trailer.

pub mod buffer;
pub mod capability;
pub mod config;
pub mod enumerated;
pub mod enumerator;
pub mod error;
pub mod keys;
pub mod page;
pub mod primitive;
pub mod search;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use buffer::{ReadBuffer, WriteBuffer};
pub use capability::{Externalizer, StringEnumerator, StringExternalizer};
pub use config::PageConfig;
pub use enumerated::{EnumeratedSetCodec, EnumeratedValueCodec};
pub use enumerator::{EnumeratorSnapshot, InMemoryStringEnumerator};
pub use error::{CodecError, CodecResult};
pub use keys::{IntLongPairKeyCodec, Uint128KeyCodec};
pub use page::{decode_page, encode_page, DecodedPage};
pub use primitive::{LongCodec, Utf8StringCodec};
pub use search::{binary_search_with_hint, search_position, try_binary_search_with_hint};
pub use traits::Codec;
