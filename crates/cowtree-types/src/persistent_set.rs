//! Immutable ordered set with structure-sharing updates.
//!
//! [`PersistentSet`] is a path-copying AVL tree whose nodes live behind
//! `Arc`s. `insert` and `union` return a new set and leave the receiver
//! untouched; only the nodes on the changed path are copied, everything
//! else is shared. A reader holding an older set never observes a writer's
//! update.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

type Link<T> = Option<Arc<Node<T>>>;

struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
    height: u32,
    size: usize,
}

fn height<T>(link: &Link<T>) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn size<T>(link: &Link<T>) -> usize {
    link.as_ref().map_or(0, |n| n.size)
}

fn make<T>(value: T, left: Link<T>, right: Link<T>) -> Arc<Node<T>> {
    let height = height(&left).max(height(&right)) + 1;
    let size = size(&left) + size(&right) + 1;
    Arc::new(Node {
        value,
        left,
        right,
        height,
        size,
    })
}

/// Rebuild a node whose subtrees may differ in height by two.
fn balance<T: Clone>(value: T, left: Link<T>, right: Link<T>) -> Arc<Node<T>> {
    let (hl, hr) = (height(&left), height(&right));
    if hl > hr + 1 {
        if let Some(l) = &left {
            if height(&l.left) >= height(&l.right) {
                let new_right = make(value, l.right.clone(), right);
                return make(l.value.clone(), l.left.clone(), Some(new_right));
            }
            if let Some(lr) = &l.right {
                let new_left = make(l.value.clone(), l.left.clone(), lr.left.clone());
                let new_right = make(value, lr.right.clone(), right);
                return make(lr.value.clone(), Some(new_left), Some(new_right));
            }
        }
    } else if hr > hl + 1 {
        if let Some(r) = &right {
            if height(&r.right) >= height(&r.left) {
                let new_left = make(value, left, r.left.clone());
                return make(r.value.clone(), Some(new_left), r.right.clone());
            }
            if let Some(rl) = &r.left {
                let new_left = make(value, left, rl.left.clone());
                let new_right = make(r.value.clone(), rl.right.clone(), r.right.clone());
                return make(rl.value.clone(), Some(new_left), Some(new_right));
            }
        }
    }
    make(value, left, right)
}

/// Returns `None` when `value` is already present, so callers can share the
/// untouched tree.
fn insert<T: Ord + Clone>(link: &Link<T>, value: T) -> Option<Arc<Node<T>>> {
    let Some(node) = link else {
        return Some(make(value, None, None));
    };
    match value.cmp(&node.value) {
        Ordering::Equal => None,
        Ordering::Less => {
            let left = insert(&node.left, value)?;
            Some(balance(node.value.clone(), Some(left), node.right.clone()))
        }
        Ordering::Greater => {
            let right = insert(&node.right, value)?;
            Some(balance(node.value.clone(), node.left.clone(), Some(right)))
        }
    }
}

/// Immutable ordered set with structure-sharing `insert` and `union`.
pub struct PersistentSet<T> {
    root: Link<T>,
}

impl<T> PersistentSet<T> {
    /// The empty set. Allocation-free; every empty set is the same value.
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        size(&self.root)
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns `true` if both sets are the same structure (not merely equal).
    ///
    /// Two empty sets are always the same structure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Iterate members in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: self.len(),
        };
        iter.push_left(&self.root);
        iter
    }
}

impl<T: Ord + Clone> PersistentSet<T> {
    pub fn contains(&self, value: &T) -> bool {
        let mut link = &self.root;
        while let Some(node) = link {
            link = match value.cmp(&node.value) {
                Ordering::Equal => return true,
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
            };
        }
        false
    }

    /// A set with `value` added. Returns a structure-sharing clone of `self`
    /// when `value` is already a member.
    #[must_use]
    pub fn insert(&self, value: T) -> Self {
        match insert(&self.root, value) {
            Some(root) => Self { root: Some(root) },
            None => self.clone(),
        }
    }

    /// The union of both sets. The larger operand's structure is reused and
    /// the smaller one's members are inserted into it.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let (base, extra) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        extra
            .iter()
            .fold(base.clone(), |acc, value| acc.insert(value.clone()))
    }
}

impl<T> Clone for PersistentSet<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<T> Default for PersistentSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for PersistentSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentSet<T> {}

impl<T: fmt::Debug> fmt::Debug for PersistentSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord + Clone> FromIterator<T> for PersistentSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |acc, value| acc.insert(value))
    }
}

impl<T: Ord + Clone> From<PersistentSet<T>> for BTreeSet<T> {
    fn from(set: PersistentSet<T>) -> Self {
        set.iter().cloned().collect()
    }
}

impl<T: Clone + Eq + Hash> From<PersistentSet<T>> for HashSet<T> {
    fn from(set: PersistentSet<T>) -> Self {
        set.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a PersistentSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Serialize> Serialize for PersistentSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T> Deserialize<'de> for PersistentSet<T>
where
    T: Deserialize<'de> + Ord + Clone,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let members = Vec::<T>::deserialize(deserializer)?;
        Ok(members.into_iter().collect())
    }
}

/// In-order iterator over a [`PersistentSet`].
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, mut link: &'a Link<T>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
