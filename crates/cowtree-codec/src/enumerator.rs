use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::capability::StringEnumerator;
use crate::error::{CodecError, CodecResult};

#[derive(Default)]
struct Dictionary {
    codes: HashMap<Arc<str>, u32>,
    values: Vec<Arc<str>>,
}

/// In-memory, HashMap-based string dictionary.
///
/// Codes are assigned densely from 0 in first-seen order. Lookups take a
/// read lock; only the first sighting of a string takes the write lock.
pub struct InMemoryStringEnumerator {
    dictionary: RwLock<Dictionary>,
}

impl InMemoryStringEnumerator {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        Self {
            dictionary: RwLock::new(Dictionary::default()),
        }
    }

    /// Rebuild a dictionary from a snapshot. Every string keeps the code it
    /// had when the snapshot was taken.
    pub fn from_snapshot(snapshot: EnumeratorSnapshot) -> CodecResult<Self> {
        let mut dictionary = Dictionary::default();
        for value in snapshot.values {
            let value: Arc<str> = Arc::from(value);
            let code = u32::try_from(dictionary.values.len()).map_err(|_| CodecError::DictionaryFull)?;
            if dictionary.codes.insert(Arc::clone(&value), code).is_some() {
                return Err(CodecError::Serialization(format!(
                    "duplicate dictionary entry {value:?}"
                )));
            }
            dictionary.values.push(value);
        }
        Ok(Self {
            dictionary: RwLock::new(dictionary),
        })
    }

    /// Number of strings assigned a code.
    pub fn len(&self) -> CodecResult<usize> {
        Ok(self.read()?.values.len())
    }

    /// Returns `true` if no string has been assigned a code.
    pub fn is_empty(&self) -> CodecResult<bool> {
        Ok(self.read()?.values.is_empty())
    }

    /// Look up an existing code without assigning one.
    pub fn code_of(&self, value: &str) -> CodecResult<Option<u32>> {
        Ok(self.read()?.codes.get(value).copied())
    }

    /// Capture all assignments, in code order.
    pub fn snapshot(&self) -> CodecResult<EnumeratorSnapshot> {
        let dictionary = self.read()?;
        Ok(EnumeratorSnapshot {
            values: dictionary.values.iter().map(|v| v.to_string()).collect(),
        })
    }

    fn read(&self) -> CodecResult<std::sync::RwLockReadGuard<'_, Dictionary>> {
        self.dictionary
            .read()
            .map_err(|e| CodecError::LockPoisoned(e.to_string()))
    }
}

impl Default for InMemoryStringEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl StringEnumerator for InMemoryStringEnumerator {
    fn enumerate(&self, value: &str) -> CodecResult<u32> {
        if let Some(&code) = self.read()?.codes.get(value) {
            return Ok(code);
        }
        let mut dictionary = self
            .dictionary
            .write()
            .map_err(|e| CodecError::LockPoisoned(e.to_string()))?;
        // Another writer may have assigned it between the two locks.
        if let Some(&code) = dictionary.codes.get(value) {
            return Ok(code);
        }
        let code = u32::try_from(dictionary.values.len()).map_err(|_| CodecError::DictionaryFull)?;
        let value: Arc<str> = Arc::from(value);
        dictionary.codes.insert(Arc::clone(&value), code);
        dictionary.values.push(value);
        trace!(code, "assigned dictionary code");
        Ok(code)
    }

    fn value_of(&self, code: u32) -> CodecResult<String> {
        self.read()?
            .values
            .get(code as usize)
            .map(|v| v.to_string())
            .ok_or(CodecError::UnknownCode(code))
    }
}

impl std::fmt::Debug for InMemoryStringEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or_default();
        f.debug_struct("InMemoryStringEnumerator")
            .field("entry_count", &count)
            .finish()
    }
}

/// Serializable copy of a dictionary: strings listed in code order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumeratorSnapshot {
    pub values: Vec<String>,
}

impl EnumeratorSnapshot {
    pub fn to_bytes(&self) -> CodecResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    pub fn from_bytes(data: &[u8]) -> CodecResult<Self> {
        bincode::deserialize(data).map_err(|e| CodecError::Serialization(e.to_string()))
    }
}
