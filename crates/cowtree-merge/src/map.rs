//! In-memory copy-on-write map over a single sorted leaf page.
//!
//! Readers clone the current root `Arc` and never block writers. A writer
//! builds a modified copy of the page from the root it read and installs it
//! only if the root version has not moved in the meantime; otherwise it
//! resets its decision maker and tries again against the newer root. After
//! [`MapConfig::optimistic_attempts`] lost races the writer holds the write
//! lock for a whole attempt, which cannot lose.

use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use cowtree_codec::search::{next_hint, search_position};
use cowtree_codec::{decode_page, encode_page, Codec, CodecError};
use tracing::{debug, trace};

use crate::config::MapConfig;
use crate::decision::{Decision, DecisionMaker, Merge, MergeDecision};
use crate::error::{MergeError, MergeResult};
use crate::makers::{EqualsTo, IfAbsent, IfPresent, PutAlways, RemoveAlways};

/// One immutable version of the map's contents.
struct LeafPage<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
    version: u64,
}

impl<K: Clone, V: Clone> LeafPage<K, V> {
    fn empty() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            version: 0,
        }
    }

    fn with_entry(&self, index: usize, key: K, value: V) -> Self {
        let mut keys = Vec::with_capacity(self.keys.len() + 1);
        keys.extend_from_slice(&self.keys[..index]);
        keys.push(key);
        keys.extend_from_slice(&self.keys[index..]);
        let mut values = Vec::with_capacity(self.values.len() + 1);
        values.extend_from_slice(&self.values[..index]);
        values.push(value);
        values.extend_from_slice(&self.values[index..]);
        Self {
            keys,
            values,
            version: self.version + 1,
        }
    }

    fn with_value(&self, index: usize, value: V) -> Self {
        let mut values = self.values.clone();
        values[index] = value;
        Self {
            keys: self.keys.clone(),
            values,
            version: self.version + 1,
        }
    }

    fn without(&self, index: usize) -> Self {
        let mut keys = self.keys.clone();
        keys.remove(index);
        let mut values = self.values.clone();
        values.remove(index);
        Self {
            keys,
            values,
            version: self.version + 1,
        }
    }
}

enum Attempt<K, V> {
    Repeat,
    Unchanged(Option<V>),
    Replace {
        page: LeafPage<K, V>,
        previous: Option<V>,
        written: usize,
    },
}

/// Concurrent sorted map with optimistic read-modify-write updates.
pub struct CowMap<K, V> {
    key_codec: Arc<dyn Codec<Value = K>>,
    value_codec: Arc<dyn Codec<Value = V>>,
    root: RwLock<Arc<LeafPage<K, V>>>,
    hint: AtomicIsize,
    unsaved_memory: AtomicUsize,
    config: MapConfig,
}

impl<K: Clone, V: Clone> CowMap<K, V> {
    pub fn new(key_codec: Arc<dyn Codec<Value = K>>, value_codec: Arc<dyn Codec<Value = V>>) -> Self {
        Self::with_config(key_codec, value_codec, MapConfig::default())
    }

    pub fn with_config(
        key_codec: Arc<dyn Codec<Value = K>>,
        value_codec: Arc<dyn Codec<Value = V>>,
        config: MapConfig,
    ) -> Self {
        Self::from_leaf(key_codec, value_codec, LeafPage::empty(), config)
    }

    fn from_leaf(
        key_codec: Arc<dyn Codec<Value = K>>,
        value_codec: Arc<dyn Codec<Value = V>>,
        leaf: LeafPage<K, V>,
        config: MapConfig,
    ) -> Self {
        Self {
            key_codec,
            value_codec,
            root: RwLock::new(Arc::new(leaf)),
            hint: AtomicIsize::new(0),
            unsaved_memory: AtomicUsize::new(0),
            config,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    fn read_root(&self) -> MergeResult<Arc<LeafPage<K, V>>> {
        let root = self
            .root
            .read()
            .map_err(|e| MergeError::LockPoisoned(e.to_string()))?;
        Ok(Arc::clone(&root))
    }

    fn write_root(&self) -> MergeResult<RwLockWriteGuard<'_, Arc<LeafPage<K, V>>>> {
        self.root
            .write()
            .map_err(|e| MergeError::LockPoisoned(e.to_string()))
    }

    /// Number of successful writes since the map was created or loaded.
    pub fn version(&self) -> MergeResult<u64> {
        Ok(self.read_root()?.version)
    }

    pub fn len(&self) -> MergeResult<usize> {
        Ok(self.read_root()?.keys.len())
    }

    pub fn is_empty(&self) -> MergeResult<bool> {
        Ok(self.read_root()?.keys.is_empty())
    }

    /// Locate `key`, seeding the search with the position of the previous
    /// lookup.
    fn search(&self, page: &LeafPage<K, V>, key: &K) -> MergeResult<isize> {
        let hint = self.hint.load(AtomicOrdering::Relaxed);
        let found = self.key_codec.binary_search(key, &page.keys, hint)?;
        self.hint.store(next_hint(found), AtomicOrdering::Relaxed);
        Ok(found)
    }

    pub fn get(&self, key: &K) -> MergeResult<Option<V>> {
        let root = self.read_root()?;
        let found = self.search(&root, key)?;
        Ok(search_position(found).ok().map(|i| root.values[i].clone()))
    }

    pub fn contains_key(&self, key: &K) -> MergeResult<bool> {
        let root = self.read_root()?;
        Ok(self.search(&root, key)? >= 0)
    }

    /// All entries in key order, as of one consistent version.
    pub fn entries(&self) -> MergeResult<Vec<(K, V)>> {
        let root = self.read_root()?;
        Ok(root
            .keys
            .iter()
            .cloned()
            .zip(root.values.iter().cloned())
            .collect())
    }

    /// Estimated memory of the entries written since the last
    /// [`mark_saved`](Self::mark_saved).
    pub fn unsaved_memory(&self) -> usize {
        self.unsaved_memory.load(AtomicOrdering::Relaxed)
    }

    pub fn mark_saved(&self) {
        self.unsaved_memory.store(0, AtomicOrdering::Relaxed);
    }

    /// Run one read-modify-write step for `key` and return the value stored
    /// before it. An aborted step returns the current value.
    ///
    /// Once the optimistic attempts are used up, `decide` and `select_value`
    /// run while the root write lock is held, so `maker` must not call back
    /// into this map.
    ///
    /// Inserting a new key into a map that already holds
    /// `config.page.max_entries` entries fails with
    /// [`CodecError::PageOverflow`], so the map always stays saveable.
    pub fn operate<D>(&self, key: &K, provided: Option<V>, maker: &D) -> MergeResult<Option<V>>
    where
        D: DecisionMaker<V> + ?Sized,
    {
        let provided = provided.as_ref();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            if attempt > self.config.optimistic_attempts {
                if attempt > 1 && attempt == self.config.optimistic_attempts + 1 {
                    debug!(
                        attempts = self.config.optimistic_attempts,
                        "optimistic update kept losing, holding write lock"
                    );
                }
                let mut root = self.write_root()?;
                match self.attempt(&root, key, provided, maker)? {
                    Attempt::Repeat => {
                        maker.reset();
                        continue;
                    }
                    Attempt::Unchanged(previous) => return Ok(previous),
                    Attempt::Replace {
                        page,
                        previous,
                        written,
                    } => {
                        *root = Arc::new(page);
                        drop(root);
                        self.charge(written);
                        return Ok(previous);
                    }
                }
            }

            let snapshot = self.read_root()?;
            match self.attempt(&snapshot, key, provided, maker)? {
                Attempt::Repeat => maker.reset(),
                Attempt::Unchanged(previous) => {
                    if self.read_root()?.version == snapshot.version {
                        return Ok(previous);
                    }
                    maker.reset();
                }
                Attempt::Replace {
                    page,
                    previous,
                    written,
                } => {
                    let mut root = self.write_root()?;
                    if root.version == snapshot.version {
                        *root = Arc::new(page);
                        drop(root);
                        self.charge(written);
                        return Ok(previous);
                    }
                    drop(root);
                    maker.reset();
                    debug!(attempt, "concurrent update won the race, retrying");
                }
            }
        }
    }

    fn attempt<D>(
        &self,
        page: &LeafPage<K, V>,
        key: &K,
        provided: Option<&V>,
        maker: &D,
    ) -> MergeResult<Attempt<K, V>>
    where
        D: DecisionMaker<V> + ?Sized,
    {
        let position = search_position(self.search(page, key)?);
        let existing = position.ok().map(|i| &page.values[i]);
        let selected = match maker.decide(existing, provided) {
            Decision::Repeat => return Ok(Attempt::Repeat),
            Decision::Abort => return Ok(Attempt::Unchanged(existing.cloned())),
            Decision::Remove => None,
            Decision::Put => maker.select_value(existing, provided),
        };

        let previous = existing.cloned();
        let (next, written) = match (position, selected) {
            (Err(_), None) => return Ok(Attempt::Unchanged(None)),
            (Ok(index), None) => (page.without(index), 0),
            (Ok(index), Some(value)) => {
                let written = self.value_codec.estimate_memory(&value);
                (page.with_value(index, value), written)
            }
            (Err(index), Some(value)) => {
                let max = self.config.page.max_entries;
                if page.keys.len() >= max {
                    return Err(CodecError::PageOverflow {
                        count: page.keys.len() + 1,
                        max,
                    }
                    .into());
                }
                let written =
                    self.key_codec.estimate_memory(key) + self.value_codec.estimate_memory(&value);
                (page.with_entry(index, key.clone(), value), written)
            }
        };
        trace!(version = next.version, entries = next.keys.len(), "page rewritten");
        Ok(Attempt::Replace {
            page: next,
            previous,
            written,
        })
    }

    fn charge(&self, written: usize) {
        self.unsaved_memory.fetch_add(written, AtomicOrdering::Relaxed);
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn put(&self, key: K, value: V) -> MergeResult<Option<V>> {
        self.operate(&key, Some(value), &PutAlways)
    }

    pub fn remove(&self, key: &K) -> MergeResult<Option<V>> {
        self.operate(key, None, &RemoveAlways)
    }

    /// Store `value` only if `key` has no entry. Returns the existing value,
    /// or `None` if `value` was stored.
    pub fn put_if_absent(&self, key: K, value: V) -> MergeResult<Option<V>> {
        self.operate(&key, Some(value), &IfAbsent)
    }

    /// Store `value` only if `key` already has an entry. Returns the value
    /// it replaced.
    pub fn replace(&self, key: K, value: V) -> MergeResult<Option<V>> {
        self.operate(&key, Some(value), &IfPresent)
    }

    /// Swap the entry to `new` if it currently equals `expected`; `None`
    /// stands for "no entry" on both sides. Returns `true` if the swap
    /// happened.
    pub fn compare_and_set(&self, key: K, expected: Option<V>, new: Option<V>) -> MergeResult<bool>
    where
        V: PartialEq,
    {
        let maker = EqualsTo::new(expected);
        self.operate(&key, new, &maker)?;
        Ok(maker.succeeded())
    }

    /// Apply `merge` to the entry under `key`, re-running it against the
    /// latest value until it wins. Returns the previous value.
    pub fn merge<M>(&self, key: K, merge: &M) -> MergeResult<Option<V>>
    where
        M: Merge<V> + ?Sized,
    {
        self.operate(&key, None, &MergeDecision::new(merge))
    }

    /// Encode the current contents as one page frame.
    pub fn to_page_bytes(&self) -> MergeResult<Vec<u8>> {
        let root = self.read_root()?;
        let bytes = encode_page(
            &*self.key_codec,
            &*self.value_codec,
            &root.keys,
            &root.values,
            &self.config.page,
        )?;
        debug!(version = root.version, bytes = bytes.len(), "map saved to page");
        Ok(bytes)
    }

    /// Load a map from a page frame written by [`to_page_bytes`](Self::to_page_bytes).
    pub fn from_page_bytes(
        key_codec: Arc<dyn Codec<Value = K>>,
        value_codec: Arc<dyn Codec<Value = V>>,
        bytes: &[u8],
        config: MapConfig,
    ) -> MergeResult<Self> {
        let page = decode_page(&*key_codec, &*value_codec, bytes, &config.page)?;
        for (index, pair) in page.keys.windows(2).enumerate() {
            if key_codec.compare(&pair[0], &pair[1])? != Ordering::Less {
                return Err(MergeError::UnsortedKeys { index: index + 1 });
            }
        }
        let leaf = LeafPage {
            keys: page.keys,
            values: page.values,
            version: 0,
        };
        Ok(Self::from_leaf(key_codec, value_codec, leaf, config))
    }
}

impl<K, V> fmt::Debug for CowMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CowMap")
            .field("key_codec", &self.key_codec.name())
            .field("value_codec", &self.value_codec.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
