//! Capabilities the enumerated codecs consume from their environment.
//!
//! Both are injected at construction time rather than looked up through a
//! process-wide accessor, so a codec can be built against a fake dictionary
//! in tests.

use std::borrow::Cow;

use crate::error::CodecResult;

/// Bidirectional dictionary between strings and small dense integers.
///
/// Implementations must be safe under concurrent calls. `enumerate` is
/// idempotent: equal strings always map to the same code, and codes stay
/// stable for the lifetime of the store that produced them.
pub trait StringEnumerator: Send + Sync {
    /// The code for `value`, assigning a new one if needed.
    fn enumerate(&self, value: &str) -> CodecResult<u32>;

    /// The string previously assigned `code`.
    ///
    /// Returns `Err(CodecError::UnknownCode)` if no string has that code,
    /// which means the dictionary and the page disagree.
    fn value_of(&self, code: u32) -> CodecResult<String>;
}

/// Maps application values to and from their string identity.
pub trait Externalizer<T>: Send + Sync {
    /// Allocate an empty staging array with room for `size` values.
    fn allocate_array(&self, size: usize) -> Vec<T> {
        Vec::with_capacity(size)
    }

    /// Rebuild a value from its string identity.
    fn create(&self, string_id: &str) -> CodecResult<T>;

    /// The string identity of `value`.
    fn string_id<'a>(&self, value: &'a T) -> Cow<'a, str>;
}

/// Externalizer for plain strings: the string is its own identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringExternalizer;

impl Externalizer<String> for StringExternalizer {
    fn create(&self, string_id: &str) -> CodecResult<String> {
        Ok(string_id.to_owned())
    }

    fn string_id<'a>(&self, value: &'a String) -> Cow<'a, str> {
        Cow::Borrowed(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_externalizer_is_identity() {
        let ext = StringExternalizer;
        let value = String::from("alpha");
        assert_eq!(ext.string_id(&value), "alpha");
        assert_eq!(ext.create("alpha").unwrap(), value);
        assert!(matches!(ext.string_id(&value), Cow::Borrowed(_)));
    }

    #[test]
    fn default_allocation_is_empty_with_capacity() {
        let storage = StringExternalizer.allocate_array(16);
        assert!(storage.is_empty());
        assert!(storage.capacity() >= 16);
    }
}
