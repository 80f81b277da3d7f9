//! JSON snapshots of finalized file-backed containers.
//!
//! A manifest carries everything needed to reopen a container read-only
//! without scanning its store file: metadata, index entries and the handles of
//! derived aggregates.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::record::{IonMode, Msn, RecordId, XyPoint};
use crate::store::Handle;

use super::aggregate::AggregateHandles;
use super::error::ContainerError;
use super::index::IndexEntry;
use super::scan::{ScanInfo, ScanLevel};

/// Index entry of a scan, tagged with its acquisition level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanEntry {
    /// Scan index
    pub id: RecordId,
    /// Retention time
    pub time: f64,
    /// Frame handle
    pub handle: Handle,
    /// Acquisition level
    pub msn: Msn,
}

impl ScanEntry {
    pub(crate) fn index_entry(&self) -> IndexEntry {
        IndexEntry {
            id: self.id,
            time: self.time,
            handle: self.handle,
        }
    }
}

/// Snapshot of a finalized file-backed scan container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanManifest {
    /// Container identifier
    pub id: String,
    /// Acquisition information
    pub info: ScanInfo,
    /// Store file
    pub data_file: PathBuf,
    /// Per-level metadata
    pub levels: Vec<ScanLevel>,
    /// Chromatogram handles
    pub aggregates: AggregateHandles,
    /// Index entries in insertion order
    pub entries: Vec<ScanEntry>,
    /// Finalization time
    pub finalized_at: DateTime<Utc>,
}

/// Snapshot of a finalized file-backed feature container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureManifest {
    /// Container identifier
    pub id: String,
    /// Ion mode of all features
    pub ion_mode: IonMode,
    /// Store file
    pub data_file: PathBuf,
    /// Index entries in insertion order
    pub entries: Vec<IndexEntry>,
    /// Finalization time
    pub finalized_at: DateTime<Utc>,
}

/// Snapshot of a finalized file-backed feature-set container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSetManifest {
    /// Container identifier
    pub id: String,
    /// Ion mode of all feature sets
    pub ion_mode: IonMode,
    /// Store file
    pub data_file: PathBuf,
    /// (retention time, base-peak m/z) of each set, in insertion order
    pub base_peaks: Vec<XyPoint>,
    /// Index entries in insertion order
    pub entries: Vec<IndexEntry>,
    /// Finalization time
    pub finalized_at: DateTime<Utc>,
}

/// Write any manifest as pretty-printed JSON
pub fn write_manifest<T: Serialize>(
    manifest: &T,
    path: impl AsRef<Path>,
) -> Result<(), ContainerError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, manifest)?;
    writer.flush()?;
    Ok(())
}

/// Read a manifest written by [`write_manifest`]
pub fn read_manifest<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ContainerError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
