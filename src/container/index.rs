use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::record::RecordId;
use crate::store::Handle;

/// Retention time usable as an ordered map key
#[derive(Debug, Clone, Copy)]
struct TimeKey(f64);

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    id: RecordId,
    time: f64,
    value: V,
}

/// Serializable index entry, as written to container manifests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Record identifier
    pub id: RecordId,
    /// Retention time
    pub time: f64,
    /// Frame handle
    pub handle: Handle,
}

/// Insertion-ordered id map with a secondary retention-time index
///
/// Re-inserting an existing id replaces its value in place (keeping its
/// position) and moves it to its new time key.
#[derive(Debug, Clone)]
pub struct RecordIndex<V> {
    entries: Vec<Entry<V>>,
    positions: HashMap<RecordId, usize>,
    by_time: BTreeMap<TimeKey, BTreeSet<RecordId>>,
}

impl<V> Default for RecordIndex<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            by_time: BTreeMap::new(),
        }
    }
}

impl<V> RecordIndex<V> {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `id`, returning the replaced value
    pub fn insert(&mut self, id: RecordId, time: f64, value: V) -> Option<V> {
        let replaced = match self.positions.get(&id) {
            Some(&pos) => {
                let entry = &mut self.entries[pos];
                let old_time = std::mem::replace(&mut entry.time, time);
                let old_value = std::mem::replace(&mut entry.value, value);
                self.unlink(id, old_time);
                Some(old_value)
            }
            None => {
                self.positions.insert(id, self.entries.len());
                self.entries.push(Entry { id, time, value });
                None
            }
        };
        self.by_time.entry(TimeKey(time)).or_default().insert(id);
        replaced
    }

    fn unlink(&mut self, id: RecordId, time: f64) {
        let key = TimeKey(time);
        if let Some(ids) = self.by_time.get_mut(&key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_time.remove(&key);
            }
        }
    }

    /// Value stored for `id`
    pub fn get(&self, id: RecordId) -> Option<&V> {
        self.positions.get(&id).map(|&pos| &self.entries[pos].value)
    }

    /// Whether `id` is indexed
    pub fn contains(&self, id: RecordId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Retention time recorded for `id`
    pub fn time_of(&self, id: RecordId) -> Option<f64> {
        self.positions.get(&id).map(|&pos| self.entries[pos].time)
    }

    /// Entry at insertion position `pos`
    pub fn entry_at(&self, pos: usize) -> Option<(RecordId, f64, &V)> {
        self.entries.get(pos).map(|e| (e.id, e.time, &e.value))
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, f64, &V)> + '_ {
        self.entries.iter().map(|e| (e.id, e.time, &e.value))
    }

    /// All values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|e| &e.value)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
        self.by_time.clear();
    }

    /// Ids with a retention time in `[from, to]`, by ascending time
    ///
    /// An inverted or NaN range matches nothing.
    pub fn ids_in_time_range(&self, from: f64, to: f64) -> Vec<RecordId> {
        if !(from <= to) {
            return Vec::new();
        }
        self.by_time
            .range(TimeKey(from)..=TimeKey(to))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }

    /// Id whose retention time is closest to `time`
    ///
    /// A tie between an earlier and a later neighbour goes to the earlier one.
    pub fn nearest(&self, time: f64) -> Option<RecordId> {
        if time.is_nan() {
            return None;
        }
        let key = TimeKey(time);
        let before = self.by_time.range(..=key).next_back();
        let after = self.by_time.range(key..).next();

        let (_, ids) = match (before, after) {
            (Some(b), Some(a)) => {
                if (a.0 .0 - time) < (time - b.0 .0) {
                    a
                } else {
                    b
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };
        ids.iter().next().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordIndex<&'static str> {
        let mut index = RecordIndex::new();
        index.insert(10, 3.0, "c");
        index.insert(11, 1.0, "a");
        index.insert(12, 2.0, "b");
        index.insert(13, 2.0, "b2");
        index
    }

    #[test]
    fn test_insertion_order_preserved() {
        let index = sample();
        let ids: Vec<_> = index.iter().map(|(id, _, _)| id).collect();
        assert_eq!(ids, vec![10, 11, 12, 13]);
        assert_eq!(index.entry_at(1), Some((11, 1.0, &"a")));
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_time_range_inclusive() {
        let index = sample();
        assert_eq!(index.ids_in_time_range(1.0, 2.0), vec![11, 12, 13]);
        assert_eq!(index.ids_in_time_range(2.5, 10.0), vec![10]);
        assert!(index.ids_in_time_range(5.0, 1.0).is_empty());
        assert!(index.ids_in_time_range(f64::NAN, 1.0).is_empty());
    }

    #[test]
    fn test_nearest_prefers_earlier_on_tie() {
        let index = sample();
        assert_eq!(index.nearest(2.5), Some(12));
        assert_eq!(index.nearest(2.9), Some(10));
        assert_eq!(index.nearest(-4.0), Some(11));
        assert_eq!(index.nearest(99.0), Some(10));
        assert_eq!(index.nearest(f64::NAN), None);
        assert_eq!(RecordIndex::<u8>::new().nearest(1.0), None);
    }

    #[test]
    fn test_replace_relinks_time() {
        let mut index = sample();
        assert_eq!(index.insert(11, 5.0, "a2"), Some("a"));
        assert_eq!(index.len(), 4);
        assert_eq!(index.time_of(11), Some(5.0));
        assert!(index.ids_in_time_range(0.0, 1.5).is_empty());
        assert_eq!(index.ids_in_time_range(4.0, 6.0), vec![11]);
        assert_eq!(index.entry_at(1), Some((11, 5.0, &"a2")));
    }

    #[test]
    fn test_clear() {
        let mut index = sample();
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.get(10), None);
        assert_eq!(index.nearest(1.0), None);
    }
}
