use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::record::{FeatureSet, IonMode, RecordId, XyPoint};
use crate::store::StoreConfig;

use super::backend::{Backend, BackendKind, FileBackend, MemoryBackend};
use super::error::ContainerError;
use super::iter::{FeatureSetFeatures, RecordIter};
use super::manifest::FeatureSetManifest;
use super::shelf::{Lifecycle, Shelf};
use super::{Container, FeatureSetContainer};

/// Feature sets (pseudo-spectra) of one ion mode
///
/// Keeps a resident (retention time, base-peak m/z) list so consumers can plot
/// or match the collection without reading any set.
#[derive(Debug)]
pub struct FeatureSetCollection<B: Backend> {
    shelf: Shelf<B, FeatureSet>,
    ion_mode: IonMode,
    base_peaks: Vec<XyPoint>,
}

impl<B: Backend> FeatureSetCollection<B> {
    fn with_backend(id: impl Into<String>, ion_mode: IonMode, backend: B) -> Self {
        Self {
            shelf: Shelf::new(id, backend),
            ion_mode,
            base_peaks: Vec::new(),
        }
    }

    fn put(&mut self, set: FeatureSet) {
        if let Some(base) = set.base_peak {
            self.base_peaks.push(XyPoint::new(set.retention_time, base.x));
        }
        self.shelf.put(set);
    }
}

impl FeatureSetCollection<FileBackend> {
    /// Create an empty file-backed collection
    pub fn new(
        id: impl Into<String>,
        ion_mode: IonMode,
        working_directory: Option<&Path>,
    ) -> Result<Self, ContainerError> {
        Self::with_config(id, ion_mode, working_directory, &StoreConfig::default())
    }

    /// Create an empty file-backed collection with a custom store configuration
    pub fn with_config(
        id: impl Into<String>,
        ion_mode: IonMode,
        working_directory: Option<&Path>,
        config: &StoreConfig,
    ) -> Result<Self, ContainerError> {
        let backend = FileBackend::create(working_directory, config)?;
        Ok(Self::with_backend(id, ion_mode, backend))
    }

    /// Reopen a finalized collection from its manifest
    pub fn reopen(
        manifest: FeatureSetManifest,
        config: &StoreConfig,
    ) -> Result<Self, ContainerError> {
        std::fs::metadata(&manifest.data_file)?;
        let backend = FileBackend::open_existing(manifest.data_file, config);
        Ok(Self {
            shelf: Shelf::restore(manifest.id, backend, &manifest.entries, manifest.finalized_at),
            ion_mode: manifest.ion_mode,
            base_peaks: manifest.base_peaks,
        })
    }

    /// Snapshot for [`reopen`](Self::reopen); requires a finalized collection
    pub fn manifest(&self) -> Result<FeatureSetManifest, ContainerError> {
        Ok(FeatureSetManifest {
            id: self.shelf.id.clone(),
            ion_mode: self.ion_mode,
            finalized_at: self.shelf.sealed_at()?,
            data_file: PathBuf::from(self.shelf.data_file()?),
            base_peaks: self.base_peaks.clone(),
            entries: self.shelf.entries(),
        })
    }
}

impl FeatureSetCollection<MemoryBackend> {
    /// Create an empty in-memory collection
    pub fn new(id: impl Into<String>, ion_mode: IonMode) -> Self {
        Self::with_backend(id, ion_mode, MemoryBackend)
    }
}

impl<B: Backend> Container for FeatureSetCollection<B> {
    type Record = FeatureSet;

    fn id(&self) -> &str {
        &self.shelf.id
    }

    fn backend(&self) -> BackendKind {
        B::KIND
    }

    fn add(&mut self, record: FeatureSet) -> Result<(), ContainerError> {
        self.shelf.ensure_open()?;
        self.put(record);
        Ok(())
    }

    fn add_all(&mut self, records: Vec<FeatureSet>) -> Result<(), ContainerError> {
        self.shelf.ensure_open()?;
        self.shelf.backend.begin_batch();
        for record in records {
            self.put(record);
        }
        self.shelf.backend.end_batch();
        Ok(())
    }

    fn get(&self, id: RecordId) -> Option<FeatureSet> {
        self.shelf.get(id)
    }

    fn iter(&self) -> RecordIter<'_, FeatureSet> {
        self.shelf.iter()
    }

    fn len(&self) -> usize {
        self.shelf.index.len()
    }

    fn finalize(&mut self, timestamp: Option<DateTime<Utc>>) -> Result<(), ContainerError> {
        match self.shelf.state {
            Lifecycle::Finalized(_) => Ok(()),
            Lifecycle::Removed => self.shelf.ensure_open(),
            Lifecycle::Open => self.shelf.seal(timestamp.unwrap_or_else(Utc::now)),
        }
    }

    fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.shelf.finalized_at()
    }

    fn remove_all(&mut self) -> bool {
        self.base_peaks.clear();
        self.shelf.remove_all()
    }

    fn working_directory(&self) -> Option<&Path> {
        self.shelf.backend.working_directory()
    }

    fn data_file(&self) -> Result<&Path, ContainerError> {
        self.shelf.data_file()
    }

    fn ids_in_time_range(&self, from: f64, to: f64) -> Vec<RecordId> {
        self.shelf.index.ids_in_time_range(from, to)
    }

    fn nearest_id(&self, time: f64) -> Option<RecordId> {
        self.shelf.index.nearest(time)
    }

    fn time_of(&self, id: RecordId) -> Option<f64> {
        self.shelf.index.time_of(id)
    }
}

impl<B: Backend> FeatureSetContainer for FeatureSetCollection<B> {
    fn ion_mode(&self) -> IonMode {
        self.ion_mode
    }

    fn base_peaks(&self) -> &[XyPoint] {
        &self.base_peaks
    }

    fn features(&self) -> FeatureSetFeatures<'_> {
        FeatureSetFeatures::new(self.shelf.iter())
    }
}
