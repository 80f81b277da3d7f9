use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::record::{Feature, IonMode, RecordId};
use crate::store::StoreConfig;

use super::backend::{Backend, BackendKind, FileBackend, MemoryBackend};
use super::error::ContainerError;
use super::iter::RecordIter;
use super::manifest::FeatureManifest;
use super::shelf::{Lifecycle, Shelf};
use super::{Container, FeatureContainer};

/// Extracted features of one ion mode
#[derive(Debug)]
pub struct FeatureCollection<B: Backend> {
    shelf: Shelf<B, Feature>,
    ion_mode: IonMode,
}

impl FeatureCollection<FileBackend> {
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
        Ok(Self {
            shelf: Shelf::new(id, FileBackend::create(working_directory, config)?),
            ion_mode,
        })
    }

    /// Reopen a finalized collection from its manifest
    pub fn reopen(manifest: FeatureManifest, config: &StoreConfig) -> Result<Self, ContainerError> {
        std::fs::metadata(&manifest.data_file)?;
        let backend = FileBackend::open_existing(manifest.data_file, config);
        Ok(Self {
            shelf: Shelf::restore(manifest.id, backend, &manifest.entries, manifest.finalized_at),
            ion_mode: manifest.ion_mode,
        })
    }

    /// Snapshot for [`reopen`](Self::reopen); requires a finalized collection
    pub fn manifest(&self) -> Result<FeatureManifest, ContainerError> {
        Ok(FeatureManifest {
            id: self.shelf.id.clone(),
            ion_mode: self.ion_mode,
            finalized_at: self.shelf.sealed_at()?,
            data_file: PathBuf::from(self.shelf.data_file()?),
            entries: self.shelf.entries(),
        })
    }
}

impl FeatureCollection<MemoryBackend> {
    /// Create an empty in-memory collection
    pub fn new(id: impl Into<String>, ion_mode: IonMode) -> Self {
        Self {
            shelf: Shelf::new(id, MemoryBackend),
            ion_mode,
        }
    }
}

impl<B: Backend> Container for FeatureCollection<B> {
    type Record = Feature;

    fn id(&self) -> &str {
        &self.shelf.id
    }

    fn backend(&self) -> BackendKind {
        B::KIND
    }

    fn add(&mut self, record: Feature) -> Result<(), ContainerError> {
        self.shelf.ensure_open()?;
        self.shelf.put(record);
        Ok(())
    }

    fn add_all(&mut self, records: Vec<Feature>) -> Result<(), ContainerError> {
        self.shelf.ensure_open()?;
        self.shelf.backend.begin_batch();
        for record in records {
            self.shelf.put(record);
        }
        self.shelf.backend.end_batch();
        Ok(())
    }

    fn get(&self, id: RecordId) -> Option<Feature> {
        self.shelf.get(id)
    }

    fn iter(&self) -> RecordIter<'_, Feature> {
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

impl<B: Backend> FeatureContainer for FeatureCollection<B> {
    fn ion_mode(&self) -> IonMode {
        self.ion_mode
    }
}
