//! # Containers
//!
//! The unit every pipeline stage consumes and produces. A container holds an
//! ordered collection of one record kind behind a single contract, whichever
//! [`Backend`] stores the records:
//!
//! - [`FileBackend`]: every record is appended to a private
//!   [`RecordStore`](crate::store::RecordStore) file as it is added; only
//!   handles stay in memory.
//! - [`MemoryBackend`]: records stay resident.
//!
//! ## Lifecycle
//!
//! A container is *open* (accepting `add`) until [`Container::finalize`], which
//! persists derived aggregates, makes the store file durable and releases its
//! handle. [`Container::remove_all`] deletes everything. A file-backed
//! container dropped before finalization deletes its temporary file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mzstore::container::{Container, FileScanContainer, ScanContainer};
//! use mzstore::record::{Msn, ScanBuilder};
//!
//! let mut scans = FileScanContainer::new("run01", None)?;
//! scans.add(ScanBuilder::new(0).retention_time(1.0).add_point(400.0, 1e4).build())?;
//! scans.finalize(None)?;
//!
//! for scan in scans.level_iter(Msn::Ms1) {
//!     println!("{} @ {}", scan.index, scan.retention_time);
//! }
//! let tic = scans.tic_chromatogram(Msn::Ms1);
//! # Ok::<(), mzstore::container::ContainerError>(())
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::record::{
    Chromatogram, Feature, FeatureSet, IndexedRecord, IonMode, Msn, RecordId, Scan, XyPoint,
};

mod aggregate;
mod backend;
mod error;
mod feature;
mod feature_set;
mod index;
mod iter;
mod manifest;
mod scan;
mod shelf;

#[cfg(test)]
mod tests;

pub use aggregate::{AggregateHandles, TicHandle};
pub use backend::{Backend, BackendKind, FileBackend, MemoryBackend, Slot};
pub use error::ContainerError;
pub use feature::FeatureCollection;
pub use feature_set::FeatureSetCollection;
pub use index::{IndexEntry, RecordIndex};
pub use iter::{FeatureSetFeatures, RecordIter};
pub use manifest::{
    read_manifest, write_manifest, FeatureManifest, FeatureSetManifest, ScanEntry, ScanManifest,
};
pub use scan::{ScanCollection, ScanInfo, ScanLevel};

/// Scan collection spilling to a store file
pub type FileScanContainer = ScanCollection<FileBackend>;
/// Scan collection kept in memory
pub type MemoryScanContainer = ScanCollection<MemoryBackend>;
/// Feature collection spilling to a store file
pub type FileFeatureContainer = FeatureCollection<FileBackend>;
/// Feature collection kept in memory
pub type MemoryFeatureContainer = FeatureCollection<MemoryBackend>;
/// Feature-set collection spilling to a store file
pub type FileFeatureSetContainer = FeatureSetCollection<FileBackend>;
/// Feature-set collection kept in memory
pub type MemoryFeatureSetContainer = FeatureSetCollection<MemoryBackend>;

/// Contract shared by every container, whatever its backend
pub trait Container: Send + Sync {
    /// Record kind held by this container
    type Record: IndexedRecord;

    /// Container identifier
    fn id(&self) -> &str;

    /// Storage backend
    fn backend(&self) -> BackendKind;

    /// Store one record and index it
    ///
    /// Fails only if the container is finalized or removed. An I/O failure
    /// while storing is logged and leaves an entry that reads as absent.
    fn add(&mut self, record: Self::Record) -> Result<(), ContainerError>;

    /// Store many records, holding the store file open for the whole batch
    fn add_all(&mut self, records: Vec<Self::Record>) -> Result<(), ContainerError>;

    /// Record with identifier `id`
    fn get(&self, id: RecordId) -> Option<Self::Record>;

    /// Lazily iterate all records in insertion order
    fn iter(&self) -> RecordIter<'_, Self::Record>;

    /// Number of indexed records
    fn len(&self) -> usize;

    /// Whether the container holds no records
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist derived data and make the container read-only
    ///
    /// `timestamp` defaults to now. Finalizing twice is a no-op.
    fn finalize(&mut self, timestamp: Option<DateTime<Utc>>) -> Result<(), ContainerError>;

    /// When the container was finalized
    fn finalized_at(&self) -> Option<DateTime<Utc>>;

    /// Whether the container is read-only
    fn is_finalized(&self) -> bool {
        self.finalized_at().is_some()
    }

    /// Delete all backing data; returns whether the container is now empty
    fn remove_all(&mut self) -> bool;

    /// Directory holding the store file, if file-backed
    fn working_directory(&self) -> Option<&Path>;

    /// Store file
    ///
    /// Memory-backed containers have none and report
    /// [`ContainerError::NotFileBacked`].
    fn data_file(&self) -> Result<&Path, ContainerError>;

    /// Ids with retention time in `[from, to]`, ascending by time
    fn ids_in_time_range(&self, from: f64, to: f64) -> Vec<RecordId>;

    /// Id with the retention time closest to `time`
    fn nearest_id(&self, time: f64) -> Option<RecordId>;

    /// Indexed retention time of `id`
    fn time_of(&self, id: RecordId) -> Option<f64>;
}

/// A collection of scans grouped by acquisition level
pub trait ScanContainer: Container<Record = Scan> {
    /// Acquisition information
    fn info(&self) -> &ScanInfo;

    /// Metadata of every level present, in level order
    fn scan_levels(&self) -> Vec<ScanLevel>;

    /// Metadata of one level
    fn scan_level(&self, msn: Msn) -> Option<&ScanLevel>;

    /// Number of scans at one level
    fn level_len(&self, msn: Msn) -> usize;

    /// The `pos`-th scan in insertion order
    fn get_by_position(&self, pos: usize) -> Option<Scan>;

    /// Lazily iterate the scans of one level; empty for an absent level
    fn level_iter(&self, msn: Msn) -> RecordIter<'_, Scan>;

    /// Total-ion chromatogram of one level, available after finalization
    fn tic_chromatogram(&self, msn: Msn) -> Option<Chromatogram>;

    /// MS1 base-peak chromatogram, available after finalization
    fn base_peak_chromatogram(&self) -> Option<Chromatogram>;
}

/// A collection of extracted features
pub trait FeatureContainer: Container<Record = Feature> {
    /// Ion mode of the features
    fn ion_mode(&self) -> IonMode;
}

/// A collection of feature sets (pseudo-spectra)
pub trait FeatureSetContainer: Container<Record = FeatureSet> {
    /// Ion mode of the feature sets
    fn ion_mode(&self) -> IonMode;

    /// (retention time, base-peak m/z) of every set, in insertion order
    fn base_peaks(&self) -> &[XyPoint];

    /// Lazily iterate every feature of every set
    fn features(&self) -> FeatureSetFeatures<'_>;
}
