//! Intermediate and final collections produced by the engine stages
//!
//! Both collections keep keys in order of first appearance so that two runs
//! over the same input iterate identically.

use indexmap::IndexMap;
use std::hash::Hash;

/// Shuffle output: every value emitted for a key, in emission order
#[derive(Debug, Clone)]
pub struct Grouped<K, V> {
    groups: IndexMap<K, Vec<V>>,
}

impl<K, V> Default for Grouped<K, V> {
    fn default() -> Self {
        Self {
            groups: IndexMap::default(),
        }
    }
}

impl<K: Hash + Eq, V> Grouped<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the sequence for `key`, creating it on first sight
    pub fn push(&mut self, key: K, value: V) {
        self.groups.entry(key).or_default().push(value);
    }

    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of grouped values across all keys
    pub fn value_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.groups
            .iter()
            .map(|(key, values)| (key, values.as_slice()))
    }
}

impl<K, V> IntoIterator for Grouped<K, V> {
    type Item = (K, Vec<V>);
    type IntoIter = indexmap::map::IntoIter<K, Vec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Reduce output: one aggregate per distinct mapped key
#[derive(Debug, Clone)]
pub struct AggregateResult<K, O> {
    outputs: IndexMap<K, O>,
}

impl<K, O> Default for AggregateResult<K, O> {
    fn default() -> Self {
        Self {
            outputs: IndexMap::default(),
        }
    }
}

impl<K: Hash + Eq, O> AggregateResult<K, O> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            outputs: IndexMap::with_capacity(capacity),
        }
    }

    /// Keys coming out of the shuffle stage are already unique
    pub(crate) fn insert_unique(&mut self, key: K, output: O) {
        let previous = self.outputs.insert(key, output);
        debug_assert!(previous.is_none());
    }

    pub fn get(&self, key: &K) -> Option<&O> {
        self.outputs.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.outputs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.outputs.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &O)> {
        self.outputs.iter()
    }
}

/// Equal when both hold the same keys and outputs in the same order
impl<K: Hash + Eq, O: PartialEq> PartialEq for AggregateResult<K, O> {
    fn eq(&self, other: &Self) -> bool {
        self.outputs.len() == other.outputs.len() && self.outputs.iter().eq(other.outputs.iter())
    }
}

impl<K, O> IntoIterator for AggregateResult<K, O> {
    type Item = (K, O);
    type IntoIter = indexmap::map::IntoIter<K, O>;

    fn into_iter(self) -> Self::IntoIter {
        self.outputs.into_iter()
    }
}
