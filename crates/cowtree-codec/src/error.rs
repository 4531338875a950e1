use thiserror::Error;

/// Errors from encode, decode, compare and search operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The codec deliberately does not implement this operation. Reaching it
    /// means the host called a path that must never be exercised.
    #[error("{operation} must not be called on {codec}")]
    UnsupportedOperation {
        codec: &'static str,
        operation: &'static str,
    },

    /// A fixed-width read ran past the end of the input.
    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A var-int ran past the end of the input.
    #[error("truncated var-int")]
    TruncatedVarInt,

    /// A var-int does not fit the target integer width.
    #[error("var-int overflows {bits}-bit integer")]
    VarIntOverflow { bits: u32 },

    /// A length does not fit the wire format's 32-bit prefix.
    #[error("length {0} exceeds the 32-bit length prefix")]
    LengthOverflow(usize),

    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// The dictionary has no string for a code read from a page.
    #[error("dictionary has no entry for code {0}")]
    UnknownCode(u32),

    /// The dictionary cannot assign further codes.
    #[error("dictionary is full")]
    DictionaryFull,

    /// The externalizer rejected a string identity.
    #[error("invalid string id {id:?}: {reason}")]
    InvalidStringId { id: String, reason: String },

    #[error("key count {keys} does not match value count {values}")]
    LengthMismatch { keys: usize, values: usize },

    #[error("page holds {count} entries, limit is {max}")]
    PageOverflow { count: usize, max: usize },

    #[error("invalid page magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported page version: {0}")]
    UnsupportedVersion(u32),

    #[error("page checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch { expected: u32, computed: u32 },

    #[error("page corrupted: {0}")]
    PageCorrupted(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl CodecError {
    pub(crate) fn unsupported(codec: &'static str, operation: &'static str) -> Self {
        Self::UnsupportedOperation { codec, operation }
    }

    /// Returns `true` for the programming-contract fault raised by
    /// intentionally unimplemented operations.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
