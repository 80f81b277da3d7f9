use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Chromatogram, ExtendableRange, IonMode, Msn, RecordId, Scan};
use crate::store::StoreConfig;

use super::aggregate::{AggregateSlots, SeriesBuffer};
use super::backend::{Backend, BackendKind, FileBackend, MemoryBackend};
use super::error::ContainerError;
use super::iter::RecordIter;
use super::manifest::{ScanEntry, ScanManifest};
use super::shelf::{Lifecycle, Shelf};
use super::{Container, ScanContainer};

/// Acquisition information of a scan collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanInfo {
    /// Identifier, usually the source file stem
    pub id: String,
    /// Free-text author or operator
    pub authors: String,
    /// Set at finalization
    pub date: Option<DateTime<Utc>>,
}

/// Metadata tracked for one acquisition level
///
/// Ranges only ever widen as scans are added.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanLevel {
    /// Acquisition level
    pub msn: Msn,
    /// Ion mode of the first scan seen at this level
    pub ion_mode: IonMode,
    /// Retention-time envelope
    pub rt_range: ExtendableRange,
    /// m/z envelope
    pub mz_range: ExtendableRange,
}

impl ScanLevel {
    fn first(scan: &Scan) -> Self {
        Self {
            msn: scan.msn,
            ion_mode: scan.ion_mode,
            rt_range: ExtendableRange::point(scan.retention_time),
            mz_range: scan.mz_range,
        }
    }

    fn widen(&mut self, scan: &Scan) {
        self.rt_range.extend_value(scan.retention_time);
        self.mz_range.extend_range(&scan.mz_range);
    }
}

/// Span of one scan, kept while the collection is open
#[derive(Debug, Clone, Copy)]
struct ScanSpan {
    time: f64,
    mz_range: ExtendableRange,
}

#[derive(Debug)]
struct LevelState {
    level: ScanLevel,
    ids: Vec<RecordId>,
    spans: HashMap<RecordId, ScanSpan>,
}

impl LevelState {
    fn first(scan: &Scan) -> Self {
        let mut state = Self {
            level: ScanLevel::first(scan),
            ids: Vec::new(),
            spans: HashMap::new(),
        };
        state.push(scan);
        state
    }

    fn restored(level: ScanLevel) -> Self {
        Self {
            level,
            ids: Vec::new(),
            spans: HashMap::new(),
        }
    }

    fn push(&mut self, scan: &Scan) {
        self.level.widen(scan);
        self.ids.push(scan.index);
        self.spans.insert(
            scan.index,
            ScanSpan {
                time: scan.retention_time,
                mz_range: scan.mz_range,
            },
        );
    }

    /// Replace a scan already filed at this level, keeping its position
    fn replace(&mut self, scan: &Scan) {
        self.spans.insert(
            scan.index,
            ScanSpan {
                time: scan.retention_time,
                mz_range: scan.mz_range,
            },
        );
        self.rebuild_ranges();
    }

    /// Drop `id`; returns whether the level is now empty
    fn remove(&mut self, id: RecordId) -> bool {
        self.ids.retain(|&other| other != id);
        self.spans.remove(&id);
        self.rebuild_ranges();
        self.ids.is_empty()
    }

    fn rebuild_ranges(&mut self) {
        let mut spans = self.ids.iter().filter_map(|id| self.spans.get(id));
        let Some(first) = spans.next() else {
            return;
        };
        let mut rt_range = ExtendableRange::point(first.time);
        let mut mz_range = first.mz_range;
        for span in spans {
            rt_range.extend_value(span.time);
            mz_range.extend_range(&span.mz_range);
        }
        self.level.rt_range = rt_range;
        self.level.mz_range = mz_range;
    }
}

/// Scans grouped by acquisition level, with derived TIC/BPC chromatograms
#[derive(Debug)]
pub struct ScanCollection<B: Backend> {
    shelf: Shelf<B, Scan>,
    info: ScanInfo,
    levels: BTreeMap<Msn, LevelState>,
    level_of: HashMap<RecordId, Msn>,
    series: Option<SeriesBuffer>,
    aggregates: AggregateSlots,
}

impl<B: Backend> ScanCollection<B> {
    pub(super) fn with_backend(id: impl Into<String>, backend: B) -> Self {
        let id = id.into();
        Self {
            info: ScanInfo {
                id: id.clone(),
                authors: String::new(),
                date: None,
            },
            shelf: Shelf::new(id, backend),
            levels: BTreeMap::new(),
            level_of: HashMap::new(),
            series: Some(SeriesBuffer::default()),
            aggregates: AggregateSlots::default(),
        }
    }

    /// Set the author recorded in [`ScanInfo`]
    pub fn set_authors(&mut self, authors: impl Into<String>) {
        self.info.authors = authors.into();
    }

    fn track(&mut self, scan: &Scan) {
        let id = scan.index;
        match self.level_of.insert(id, scan.msn) {
            Some(previous) if previous == scan.msn => {
                if let Some(state) = self.levels.get_mut(&previous) {
                    state.replace(scan);
                }
            }
            previous => {
                // re-added id filed under another level: move it
                if let Some(previous) = previous {
                    let emptied = self
                        .levels
                        .get_mut(&previous)
                        .is_some_and(|state| state.remove(id));
                    if emptied {
                        self.levels.remove(&previous);
                    }
                }
                match self.levels.get_mut(&scan.msn) {
                    Some(state) => state.push(scan),
                    None => {
                        self.levels.insert(scan.msn, LevelState::first(scan));
                    }
                }
            }
        }

        if let Some(series) = self.series.as_mut() {
            series.record(scan);
        }
    }

    fn put(&mut self, scan: Scan) {
        self.track(&scan);
        self.shelf.put(scan);
    }
}

impl ScanCollection<FileBackend> {
    /// Create an empty file-backed collection
    ///
    /// The store file goes into `working_directory`, or the system temp
    /// directory when `None`.
    pub fn new(
        id: impl Into<String>,
        working_directory: Option<&Path>,
    ) -> Result<Self, ContainerError> {
        Self::with_config(id, working_directory, &StoreConfig::default())
    }

    /// Create an empty file-backed collection with a custom store configuration
    pub fn with_config(
        id: impl Into<String>,
        working_directory: Option<&Path>,
        config: &StoreConfig,
    ) -> Result<Self, ContainerError> {
        let backend = FileBackend::create(working_directory, config)?;
        Ok(Self::with_backend(id, backend))
    }

    /// Reopen a finalized collection from its manifest without reading frames
    pub fn reopen(manifest: ScanManifest, config: &StoreConfig) -> Result<Self, ContainerError> {
        std::fs::metadata(&manifest.data_file)?;

        let mut levels: BTreeMap<Msn, LevelState> = manifest
            .levels
            .iter()
            .map(|&level| (level.msn, LevelState::restored(level)))
            .collect();

        let mut level_of = HashMap::with_capacity(manifest.entries.len());
        for entry in &manifest.entries {
            let state = levels.get_mut(&entry.msn).ok_or_else(|| {
                ContainerError::InvalidManifest(format!(
                    "scan {} refers to missing level {}",
                    entry.id, entry.msn
                ))
            })?;
            state.ids.push(entry.id);
            level_of.insert(entry.id, entry.msn);
        }

        let entries: Vec<_> = manifest.entries.iter().map(ScanEntry::index_entry).collect();
        let backend = FileBackend::open_existing(manifest.data_file, config);

        Ok(Self {
            shelf: Shelf::restore(manifest.id, backend, &entries, manifest.finalized_at),
            info: manifest.info,
            levels,
            level_of,
            series: None,
            aggregates: AggregateSlots::from_handles(&manifest.aggregates),
        })
    }

    /// Snapshot for [`reopen`](Self::reopen); requires a finalized collection
    pub fn manifest(&self) -> Result<ScanManifest, ContainerError> {
        let finalized_at = self.shelf.sealed_at()?;
        let entries = self
            .shelf
            .index
            .iter()
            .map(|(id, time, slot)| ScanEntry {
                id,
                time,
                handle: slot.handle(),
                msn: self.level_of.get(&id).copied().unwrap_or(Msn::Ms1),
            })
            .collect();

        Ok(ScanManifest {
            id: self.shelf.id.clone(),
            info: self.info.clone(),
            data_file: PathBuf::from(self.shelf.data_file()?),
            levels: self.levels.values().map(|s| s.level).collect(),
            aggregates: self.aggregates.handles(),
            entries,
            finalized_at,
        })
    }
}

impl ScanCollection<MemoryBackend> {
    /// Create an empty in-memory collection
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_backend(id, MemoryBackend)
    }
}

impl<B: Backend> Container for ScanCollection<B> {
    type Record = Scan;

    fn id(&self) -> &str {
        &self.shelf.id
    }

    fn backend(&self) -> BackendKind {
        B::KIND
    }

    fn add(&mut self, record: Scan) -> Result<(), ContainerError> {
        self.shelf.ensure_open()?;
        self.put(record);
        Ok(())
    }

    fn add_all(&mut self, records: Vec<Scan>) -> Result<(), ContainerError> {
        self.shelf.ensure_open()?;
        self.shelf.backend.begin_batch();
        for record in records {
            self.put(record);
        }
        self.shelf.backend.end_batch();
        Ok(())
    }

    fn get(&self, id: RecordId) -> Option<Scan> {
        self.shelf.get(id)
    }

    fn iter(&self) -> RecordIter<'_, Scan> {
        self.shelf.iter()
    }

    fn len(&self) -> usize {
        self.shelf.index.len()
    }

    fn finalize(&mut self, timestamp: Option<DateTime<Utc>>) -> Result<(), ContainerError> {
        match self.shelf.state {
            Lifecycle::Finalized(_) => return Ok(()),
            Lifecycle::Removed => return self.shelf.ensure_open(),
            Lifecycle::Open => {}
        }

        let timestamp = timestamp.unwrap_or_else(Utc::now);
        let mut aggregates = AggregateSlots::default();
        if let Some(series) = self.series.as_ref() {
            let (bpc, tics) = series.chromatograms();
            aggregates.base_peak = Some(self.shelf.backend.put(bpc));
            for tic in tics {
                let msn = tic.msn;
                let slot = self.shelf.backend.put(tic);
                aggregates.total_ion.insert(msn, slot);
            }
        }

        // a failed seal leaves the collection open with its series intact
        self.shelf.seal(timestamp)?;
        self.aggregates = aggregates;
        self.series = None;
        for state in self.levels.values_mut() {
            state.spans = HashMap::new();
        }
        self.info.date = Some(timestamp);
        Ok(())
    }

    fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.shelf.finalized_at()
    }

    fn remove_all(&mut self) -> bool {
        self.levels.clear();
        self.level_of.clear();
        self.series = None;
        self.aggregates.clear();
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

impl<B: Backend> ScanContainer for ScanCollection<B> {
    fn info(&self) -> &ScanInfo {
        &self.info
    }

    fn scan_levels(&self) -> Vec<ScanLevel> {
        self.levels.values().map(|s| s.level).collect()
    }

    fn scan_level(&self, msn: Msn) -> Option<&ScanLevel> {
        self.levels.get(&msn).map(|s| &s.level)
    }

    fn level_len(&self, msn: Msn) -> usize {
        self.levels.get(&msn).map_or(0, |s| s.ids.len())
    }

    fn get_by_position(&self, pos: usize) -> Option<Scan> {
        self.shelf.get_by_position(pos)
    }

    fn level_iter(&self, msn: Msn) -> RecordIter<'_, Scan> {
        match self.levels.get(&msn) {
            Some(state) => self.shelf.iter_ids(&state.ids),
            None => RecordIter::empty(),
        }
    }

    fn tic_chromatogram(&self, msn: Msn) -> Option<Chromatogram> {
        let slot = self.aggregates.total_ion.get(&msn)?;
        self.shelf.backend.resolve(slot)
    }

    fn base_peak_chromatogram(&self) -> Option<Chromatogram> {
        let slot = self.aggregates.base_peak.as_ref()?;
        self.shelf.backend.resolve(slot)
    }
}
