//! First-occurrence deduplication.

use std::collections::HashSet;
use std::hash::Hash;

/// Remembers identities across batches of one run.
#[derive(Debug)]
pub struct Deduplicator<K> {
    seen: HashSet<K>,
    dropped: usize,
}

impl<K: Eq + Hash> Deduplicator<K> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
            dropped: 0,
        }
    }

    /// Returns `true` the first time `key` is offered.
    pub fn admit(&mut self, key: K) -> bool {
        let first = self.seen.insert(key);
        if !first {
            self.dropped += 1;
        }
        first
    }

    /// Keep the first record of each identity, in input order.
    pub fn retain_first<T, F>(&mut self, records: impl IntoIterator<Item = T>, key: F) -> Vec<T>
    where
        F: Fn(&T) -> K,
    {
        records
            .into_iter()
            .filter(|record| self.admit(key(record)))
            .collect()
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped
    }
}

impl<K: Eq + Hash> Default for Deduplicator<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator adapter yielding the first record of each identity.
pub struct UniqueBy<I, F, K> {
    inner: I,
    key: F,
    seen: HashSet<K>,
}

impl<I, F, K> Iterator for UniqueBy<I, F, K>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
    K: Eq + Hash,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        for item in self.inner.by_ref() {
            if self.seen.insert((self.key)(&item)) {
                return Some(item);
            }
        }
        None
    }
}

/// Adds `unique_by` to every iterator.
pub trait UniqueByExt: Iterator + Sized {
    fn unique_by<K, F>(self, key: F) -> UniqueBy<Self, F, K>
    where
        F: FnMut(&Self::Item) -> K,
        K: Eq + Hash,
    {
        UniqueBy {
            inner: self,
            key,
            seen: HashSet::new(),
        }
    }
}

impl<I: Iterator> UniqueByExt for I {}
