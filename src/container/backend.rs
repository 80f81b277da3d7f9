use std::fmt;
use std::path::{Path, PathBuf};

use log::error;
use serde::{Deserialize, Serialize};

use crate::record::StoredRecord;
use crate::store::{Handle, RecordStore, StoreConfig, StoreError};

/// Where a container keeps its records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Spill every record to an append-only store file
    #[default]
    File,
    /// Keep every record resident
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::File => f.write_str("file"),
            BackendKind::Memory => f.write_str("memory"),
        }
    }
}

/// What an index entry points at: a stored frame or a resident record
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<R> {
    /// Frame in the backing store
    Stored(Handle),
    /// Record kept in memory
    Resident(R),
}

impl<R> Slot<R> {
    /// Store handle, or the sentinel for resident records
    pub fn handle(&self) -> Handle {
        match self {
            Slot::Stored(handle) => *handle,
            Slot::Resident(_) => Handle::INVALID,
        }
    }
}

/// Resolve a slot to its record, reading through `store` for stored frames
pub(crate) fn resolve_slot<R: StoredRecord>(
    slot: &Slot<R>,
    store: Option<&RecordStore>,
) -> Option<R> {
    match slot {
        Slot::Stored(handle) => store?.read(*handle),
        Slot::Resident(record) => Some(record.clone()),
    }
}

/// Storage strategy behind a container
pub trait Backend: Send + Sync + 'static {
    /// Tag reported by containers using this backend
    const KIND: BackendKind;

    /// Take ownership of `record` and return where it now lives
    fn put<R: StoredRecord>(&mut self, record: R) -> Slot<R>;

    /// Backing store, if any
    fn store(&self) -> Option<&RecordStore>;

    /// Look up the record behind `slot`
    fn resolve<R: StoredRecord>(&self, slot: &Slot<R>) -> Option<R> {
        resolve_slot(slot, self.store())
    }

    /// Prepare for a run of `put` calls
    fn begin_batch(&mut self) {}

    /// End a run of `put` calls
    fn end_batch(&mut self) {}

    /// Make all written data durable and release resources held for writing
    fn seal(&mut self) -> Result<(), StoreError>;

    /// Delete all backing data; returns whether it is gone
    fn purge(&mut self) -> bool;

    /// Directory holding the backing file
    fn working_directory(&self) -> Option<&Path>;

    /// Backing file
    fn data_file(&self) -> Option<&Path>;
}

/// Backend that appends every record to a [`RecordStore`]
#[derive(Debug)]
pub struct FileBackend {
    store: RecordStore,
}

impl FileBackend {
    /// Create a fresh temporary store in `working_directory`
    ///
    /// Falls back to the system temp directory.
    pub fn create(
        working_directory: Option<&Path>,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        let dir = working_directory
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        Ok(Self {
            store: RecordStore::create_in(dir, config)?,
        })
    }

    /// Bind to a previously persisted store file
    pub fn open_existing(path: impl Into<PathBuf>, config: &StoreConfig) -> Self {
        Self {
            store: RecordStore::open_existing(path, config),
        }
    }

    /// Backing store
    pub fn record_store(&self) -> &RecordStore {
        &self.store
    }
}

impl Backend for FileBackend {
    const KIND: BackendKind = BackendKind::File;

    fn put<R: StoredRecord>(&mut self, record: R) -> Slot<R> {
        Slot::Stored(self.store.write(&record))
    }

    fn store(&self) -> Option<&RecordStore> {
        Some(&self.store)
    }

    fn begin_batch(&mut self) {
        // a failed open is retried, and logged, by each write
        if let Err(e) = self.store.open() {
            error!("Failed to open {}: {}", self.store.path().display(), e);
        }
    }

    fn end_batch(&mut self) {
        self.store.close();
    }

    fn seal(&mut self) -> Result<(), StoreError> {
        if self.store.is_temporary() {
            self.store.persist()
        } else {
            self.store.close();
            Ok(())
        }
    }

    fn purge(&mut self) -> bool {
        self.store.remove()
    }

    fn working_directory(&self) -> Option<&Path> {
        self.store.working_directory()
    }

    fn data_file(&self) -> Option<&Path> {
        Some(self.store.path())
    }
}

/// Backend that keeps every record resident
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryBackend;

impl Backend for MemoryBackend {
    const KIND: BackendKind = BackendKind::Memory;

    fn put<R: StoredRecord>(&mut self, record: R) -> Slot<R> {
        Slot::Resident(record)
    }

    fn store(&self) -> Option<&RecordStore> {
        None
    }

    fn seal(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    fn purge(&mut self) -> bool {
        true
    }

    fn working_directory(&self) -> Option<&Path> {
        None
    }

    fn data_file(&self) -> Option<&Path> {
        None
    }
}
