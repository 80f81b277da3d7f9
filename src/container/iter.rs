use std::vec;

use crate::record::{Feature, FeatureSet, StoredRecord};
use crate::store::RecordStore;

use super::backend::{resolve_slot, Slot};

/// Lazy iterator over a snapshot of container slots
///
/// The slot order is fixed when the iterator is created. Records are read one
/// at a time; a slot that fails to resolve is skipped, so a damaged store
/// under-reports instead of failing.
pub struct RecordIter<'a, R> {
    slots: vec::IntoIter<&'a Slot<R>>,
    store: Option<&'a RecordStore>,
}

impl<'a, R: StoredRecord> RecordIter<'a, R> {
    pub(crate) fn new(slots: Vec<&'a Slot<R>>, store: Option<&'a RecordStore>) -> Self {
        Self {
            slots: slots.into_iter(),
            store,
        }
    }

    /// An iterator that yields nothing
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Number of slots not yet visited
    pub fn remaining(&self) -> usize {
        self.slots.len()
    }
}

impl<R: StoredRecord> Iterator for RecordIter<'_, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        for slot in self.slots.by_ref() {
            if let Some(record) = resolve_slot(slot, self.store) {
                return Some(record);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len()))
    }
}

/// Every feature of every feature set, in set order
pub struct FeatureSetFeatures<'a> {
    sets: RecordIter<'a, FeatureSet>,
    current: vec::IntoIter<Feature>,
}

impl<'a> FeatureSetFeatures<'a> {
    pub(crate) fn new(sets: RecordIter<'a, FeatureSet>) -> Self {
        Self {
            sets,
            current: Vec::new().into_iter(),
        }
    }
}

impl Iterator for FeatureSetFeatures<'_> {
    type Item = Feature;

    fn next(&mut self) -> Option<Feature> {
        loop {
            if let Some(feature) = self.current.next() {
                return Some(feature);
            }
            self.current = self.sets.next()?.features.into_iter();
        }
    }
}
