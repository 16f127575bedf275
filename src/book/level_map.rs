/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! `LevelMap`: a price-ordered `price -> Level` index, spec §4.3.
//!
//! Backed by `crossbeam_skiplist::SkipMap`, the same ordered container the
//! teacher crate uses for its own two price ladders — generalized here to
//! all six of the book's maps (bid/ask limit, bid/ask stop, bid/ask
//! trailing-stop). "Hinted" insertion/iteration positions are naturally free
//! on a skiplist: a `get`/`lower_bound` near the hint is already
//! logarithmic, so the hint parameter is accepted for interface fidelity to
//! spec §4.3 but does not require a separate code path.

use crate::book::level::Level;
use crossbeam_skiplist::SkipMap;
use std::ops::Bound;
use std::sync::Arc;

/// A price-ordered index of `Level`s, ascending by key.
#[derive(Debug, Default)]
pub struct LevelMap {
    inner: SkipMap<u64, Arc<Level>>,
}

impl LevelMap {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: SkipMap::new(),
        }
    }

    /// Insert a level at `price`, overwriting any level already there.
    pub fn put(&self, price: u64, level: Arc<Level>) {
        self.inner.insert(price, level);
    }

    /// Insert a level at `price`. `hint` names a nearby already-present key
    /// the caller expects to accelerate placement; skiplist insertion is
    /// already logarithmic everywhere so the hint is accepted but unused.
    pub fn put_with_hint(&self, price: u64, level: Arc<Level>, _hint: Option<u64>) {
        self.put(price, level);
    }

    /// Look up the level at `price`, if any.
    #[must_use]
    pub fn get(&self, price: u64) -> Option<Arc<Level>> {
        self.inner.get(&price).map(|e| e.value().clone())
    }

    /// Remove the level at `price`, returning it if present.
    pub fn delete(&self, price: u64) -> Option<Arc<Level>> {
        self.inner.remove(&price).map(|e| e.value().clone())
    }

    /// True when the map holds no levels.
    #[must_use]
    pub fn empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of levels currently indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Alias for `!empty()`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty()
    }

    /// Return the level at `price`, inserting a fresh empty one first if
    /// none exists yet.
    pub fn emplace(
        &self,
        price: u64,
        side: crate::book::order::Side,
        kind: crate::book::order::MapKind,
        symbol_id: u64,
    ) -> Arc<Level> {
        self.emplace_with_hint(price, side, kind, symbol_id, None)
    }

    /// Hinted variant of `emplace`; the hint is accepted for interface
    /// fidelity but unused (see module docs).
    pub fn emplace_with_hint(
        &self,
        price: u64,
        side: crate::book::order::Side,
        kind: crate::book::order::MapKind,
        symbol_id: u64,
        hint: Option<u64>,
    ) -> Arc<Level> {
        if let Some(existing) = self.get(price) {
            return existing;
        }
        let level = Arc::new(Level::new(side, kind, price, symbol_id));
        self.put_with_hint(price, level.clone(), hint);
        level
    }

    /// The lowest-keyed entry, i.e. "begin".
    #[must_use]
    pub fn first(&self) -> Option<(u64, Arc<Level>)> {
        self.inner.front().map(|e| (*e.key(), e.value().clone()))
    }

    /// The highest-keyed entry, i.e. one before "end".
    #[must_use]
    pub fn last(&self) -> Option<(u64, Arc<Level>)> {
        self.inner.back().map(|e| (*e.key(), e.value().clone()))
    }

    /// The lowest key strictly greater than or equal to `price`.
    #[must_use]
    pub fn ceiling(&self, price: u64) -> Option<(u64, Arc<Level>)> {
        self.inner
            .range((Bound::Included(price), Bound::Unbounded))
            .next()
            .map(|e| (*e.key(), e.value().clone()))
    }

    /// The highest key strictly less than or equal to `price`.
    #[must_use]
    pub fn floor(&self, price: u64) -> Option<(u64, Arc<Level>)> {
        self.inner
            .range((Bound::Unbounded, Bound::Included(price)))
            .next_back()
            .map(|e| (*e.key(), e.value().clone()))
    }

    /// Atomically-from-the-outside-visible replace: clears every entry and
    /// inserts `entries` in its place. Used by trailing-stop recomputation
    /// to swap in a freshly rebuilt map without needing `&mut self`
    /// anywhere in the single-writer `OrderBook` (spec §4.4 "Trailing
    /// pricing").
    pub fn replace_all(&self, entries: Vec<(u64, Arc<Level>)>) {
        self.inner.clear();
        for (price, level) in entries {
            self.inner.insert(price, level);
        }
    }

    /// Ascending iteration over (price, level) pairs, lowest first.
    pub fn iter_ascending(&self) -> impl DoubleEndedIterator<Item = (u64, Arc<Level>)> + '_ {
        self.inner.iter().map(|e| (*e.key(), e.value().clone()))
    }

    /// Descending iteration over (price, level) pairs, highest first.
    pub fn iter_descending(&self) -> impl Iterator<Item = (u64, Arc<Level>)> + '_ {
        self.inner.iter().rev().map(|e| (*e.key(), e.value().clone()))
    }

    /// Top `n` (price, volume) pairs ascending by price.
    #[must_use]
    pub fn top_n_ascending(&self, n: usize) -> Vec<(u64, u64)> {
        self.iter_ascending()
            .take(n)
            .map(|(p, l)| (p, l.volume()))
            .collect()
    }

    /// Top `n` (price, volume) pairs descending by price.
    #[must_use]
    pub fn top_n_descending(&self, n: usize) -> Vec<(u64, u64)> {
        self.iter_descending()
            .take(n)
            .map(|(p, l)| (p, l.volume()))
            .collect()
    }
}
