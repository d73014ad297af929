//! Stamped tile tables.
//!
//! A [`TileTable`] maps tile keys to values annotated with a recency stamp.
//! Every lookup and insert refreshes the entry's stamp to the current
//! most-urgent value, so the table doubles as an LRU structure without a
//! linked list: the least-urgent entry is the eviction victim, the
//! most-urgent entry is what a worker should process next.
//!
//! Tables are internally synchronized; all operations take `&self`. The
//! extreme-entry scans are O(n), which is acceptable because every table in
//! the cache is capacity-bounded to tens or low hundreds of live entries.

mod stamp;

pub use stamp::{RecencyStamp, StampClock, STAMPS_PER_EPOCH};

use crate::coord::TileKey;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug)]
struct TableEntry<V> {
    value: V,
    stamp: RecencyStamp,
}

#[derive(Debug)]
struct TableInner<V> {
    entries: HashMap<TileKey, TableEntry<V>>,
    clock: StampClock,
}

/// Keyed container mapping [`TileKey`] to a value plus recency stamp.
pub struct TileTable<V> {
    inner: Mutex<TableInner<V>>,
}

impl<V> TileTable<V> {
    /// Create an empty table positioned at the start of its first epoch.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TableInner {
                entries: HashMap::new(),
                clock: StampClock::new(),
            }),
        }
    }

    /// Look up a key, refreshing its stamp to the current most-urgent value.
    ///
    /// The refresh is the entire recency mechanism: an entry returned by
    /// `get` will not be picked as an eviction victim ahead of entries that
    /// were touched less recently.
    pub fn get(&self, key: &TileKey) -> Option<V>
    where
        V: Clone,
    {
        let mut guard = self.inner.lock().unwrap();
        let TableInner { entries, clock } = &mut *guard;
        entries.get_mut(key).map(|entry| {
            entry.stamp = clock.issue();
            entry.value.clone()
        })
    }

    /// Insert or overwrite a value, stamping it as most urgent.
    pub fn put(&self, key: TileKey, value: V) {
        let mut inner = self.inner.lock().unwrap();
        let stamp = inner.clock.issue();
        inner.entries.insert(key, TableEntry { value, stamp });
    }

    /// Remove an entry, returning its value. No-op if absent.
    pub fn remove(&self, key: &TileKey) -> Option<V> {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.remove(key).map(|entry| entry.value)
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
    }

    /// Take all entries out of the table, leaving it empty.
    pub fn drain(&self) -> Vec<(TileKey, V)> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .entries
            .drain()
            .map(|(key, entry)| (key, entry.value))
            .collect()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Key of the entry with the smallest stamp, or `None` if empty.
    ///
    /// This is the entry a worker should process next.
    pub fn most_urgent(&self) -> Option<TileKey> {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stamp)
            .map(|(key, _)| *key)
    }

    /// Key of the entry with the largest stamp, or `None` if empty.
    ///
    /// This is the eviction victim: the entry touched least recently.
    pub fn least_urgent(&self) -> Option<TileKey> {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .iter()
            .max_by_key(|(_, entry)| entry.stamp)
            .map(|(key, _)| *key)
    }

    /// Advance the table's epoch.
    ///
    /// All stamps issued after this call are strictly more urgent than any
    /// stamp from a prior epoch. Stored stamps are unaffected.
    pub fn begin_epoch(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.clock.begin_epoch();
    }
}

impl<V> Default for TileTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(col: u32) -> TileKey {
        TileKey::new(15, col, 100)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Basic operations
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn get_returns_none_for_absent_key() {
        let table: TileTable<u32> = TileTable::new();
        assert_eq!(table.get(&key(1)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn put_then_get_returns_value() {
        let table = TileTable::new();
        table.put(key(1), 42u32);

        assert_eq!(table.get(&key(1)), Some(42));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn put_overwrites_existing_value() {
        let table = TileTable::new();
        table.put(key(1), 1u32);
        table.put(key(1), 2u32);

        assert_eq!(table.get(&key(1)), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn remove_returns_value_and_is_noop_when_absent() {
        let table = TileTable::new();
        table.put(key(1), 7u32);

        assert_eq!(table.remove(&key(1)), Some(7));
        assert_eq!(table.remove(&key(1)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let table = TileTable::new();
        for col in 0..5 {
            table.put(key(col), col);
        }
        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.get(&key(0)), None);
    }

    #[test]
    fn drain_takes_all_values() {
        let table = TileTable::new();
        table.put(key(1), 10u32);
        table.put(key(2), 20u32);

        let mut drained = table.drain();
        drained.sort_by_key(|(k, _)| k.col);

        assert_eq!(drained, vec![(key(1), 10), (key(2), 20)]);
        assert!(table.is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recency ordering
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn most_and_least_urgent_follow_insertion_order() {
        let table = TileTable::new();
        table.put(key(1), ());
        table.put(key(2), ());
        table.put(key(3), ());

        // Later puts are more urgent than earlier ones
        assert_eq!(table.most_urgent(), Some(key(3)));
        assert_eq!(table.least_urgent(), Some(key(1)));
    }

    #[test]
    fn extremes_are_none_when_empty() {
        let table: TileTable<()> = TileTable::new();
        assert_eq!(table.most_urgent(), None);
        assert_eq!(table.least_urgent(), None);
    }

    #[test]
    fn get_refreshes_recency() {
        let table = TileTable::new();
        table.put(key(1), ());
        table.put(key(2), ());

        // Touch the older entry; it becomes most urgent
        table.get(&key(1));

        assert_eq!(table.most_urgent(), Some(key(1)));
        assert_eq!(table.least_urgent(), Some(key(2)));
    }

    #[test]
    fn begin_epoch_makes_new_touches_dominate() {
        let table = TileTable::new();
        table.put(key(1), ());
        table.put(key(2), ());

        table.begin_epoch();
        table.put(key(3), ());

        // The single post-epoch touch outranks every pre-epoch touch
        assert_eq!(table.most_urgent(), Some(key(3)));
        assert_eq!(table.least_urgent(), Some(key(1)));
    }

    #[test]
    fn begin_epoch_does_not_disturb_stored_order() {
        let table = TileTable::new();
        table.put(key(1), ());
        table.put(key(2), ());

        table.begin_epoch();

        // Relative order of untouched entries is unchanged
        assert_eq!(table.most_urgent(), Some(key(2)));
        assert_eq!(table.least_urgent(), Some(key(1)));
    }

    #[test]
    fn eviction_victim_is_least_recently_touched() {
        let table = TileTable::new();
        table.put(key(1), ());
        table.put(key(2), ());
        table.put(key(3), ());

        // Touch 1 and 3; 2 is now the coldest
        table.get(&key(1));
        table.get(&key(3));

        assert_eq!(table.least_urgent(), Some(key(2)));
    }
}
