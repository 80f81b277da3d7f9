use std::path::Path;

use chrono::{DateTime, Utc};
use log::debug;

use crate::record::{IndexedRecord, RecordId};

use super::backend::{Backend, Slot};
use super::error::ContainerError;
use super::index::{IndexEntry, RecordIndex};
use super::iter::RecordIter;

/// Lifecycle of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    /// Accepting appends
    Open,
    /// Read-only since the given time
    Finalized(DateTime<Utc>),
    /// Backing data deleted
    Removed,
}

/// Record storage shared by every container kind: a backend plus its index
#[derive(Debug)]
pub(crate) struct Shelf<B, R> {
    pub(crate) id: String,
    pub(crate) backend: B,
    pub(crate) index: RecordIndex<Slot<R>>,
    pub(crate) state: Lifecycle,
}

impl<B: Backend, R: IndexedRecord> Shelf<B, R> {
    pub(crate) fn new(id: impl Into<String>, backend: B) -> Self {
        Self {
            id: id.into(),
            backend,
            index: RecordIndex::new(),
            state: Lifecycle::Open,
        }
    }

    /// Rebuild a finalized shelf from manifest entries
    pub(crate) fn restore(
        id: impl Into<String>,
        backend: B,
        entries: &[IndexEntry],
        finalized_at: DateTime<Utc>,
    ) -> Self {
        let mut index = RecordIndex::new();
        for entry in entries {
            index.insert(entry.id, entry.time, Slot::Stored(entry.handle));
        }
        Self {
            id: id.into(),
            backend,
            index,
            state: Lifecycle::Finalized(finalized_at),
        }
    }

    pub(crate) fn ensure_open(&self) -> Result<(), ContainerError> {
        match self.state {
            Lifecycle::Open => Ok(()),
            Lifecycle::Finalized(_) => Err(ContainerError::ReadOnly {
                id: self.id.clone(),
            }),
            Lifecycle::Removed => Err(ContainerError::Removed {
                id: self.id.clone(),
            }),
        }
    }

    /// Store `record` and index it; the caller has checked the lifecycle
    pub(crate) fn put(&mut self, record: R) {
        let id = record.id();
        let time = record.retention_time();
        let slot = self.backend.put(record);
        self.index.insert(id, time, slot);
    }

    pub(crate) fn get(&self, id: RecordId) -> Option<R> {
        self.backend.resolve(self.index.get(id)?)
    }

    pub(crate) fn get_by_position(&self, pos: usize) -> Option<R> {
        let (_, _, slot) = self.index.entry_at(pos)?;
        self.backend.resolve(slot)
    }

    pub(crate) fn iter(&self) -> RecordIter<'_, R> {
        RecordIter::new(self.index.values().collect(), self.backend.store())
    }

    /// Iterate the records named by `ids`, in that order
    pub(crate) fn iter_ids(&self, ids: &[RecordId]) -> RecordIter<'_, R> {
        let slots = ids.iter().filter_map(|&id| self.index.get(id)).collect();
        RecordIter::new(slots, self.backend.store())
    }

    /// Seal the backend and mark the shelf read-only
    pub(crate) fn seal(&mut self, timestamp: DateTime<Utc>) -> Result<(), ContainerError> {
        self.backend.seal()?;
        self.state = Lifecycle::Finalized(timestamp);
        debug!("Finalized container '{}' ({} records)", self.id, self.index.len());
        Ok(())
    }

    pub(crate) fn finalized_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            Lifecycle::Finalized(at) => Some(at),
            _ => None,
        }
    }

    /// Delete backing data and forget every record
    pub(crate) fn remove_all(&mut self) -> bool {
        let purged = self.backend.purge();
        self.index.clear();
        self.state = Lifecycle::Removed;
        debug!("Removed container '{}'", self.id);
        purged && self.index.is_empty()
    }

    /// Backing file; a memory backend never has one, removed or not
    pub(crate) fn data_file(&self) -> Result<&Path, ContainerError> {
        let path = self
            .backend
            .data_file()
            .ok_or_else(|| ContainerError::NotFileBacked {
                id: self.id.clone(),
            })?;
        if self.state == Lifecycle::Removed {
            return Err(ContainerError::Removed {
                id: self.id.clone(),
            });
        }
        Ok(path)
    }

    /// Finalization time, failing unless the shelf is finalized
    pub(crate) fn sealed_at(&self) -> Result<DateTime<Utc>, ContainerError> {
        match self.state {
            Lifecycle::Finalized(at) => Ok(at),
            Lifecycle::Open => Err(ContainerError::NotFinalized {
                id: self.id.clone(),
            }),
            Lifecycle::Removed => Err(ContainerError::Removed {
                id: self.id.clone(),
            }),
        }
    }

    pub(crate) fn entries(&self) -> Vec<IndexEntry> {
        self.index
            .iter()
            .map(|(id, time, slot)| IndexEntry {
                id,
                time,
                handle: slot.handle(),
            })
            .collect()
    }
}
