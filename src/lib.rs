//! # mzstore - Record Storage for Mass Spectrometry Pipelines
//!
//! `mzstore` is the storage layer shared by every stage of a mass spectrometry
//! processing pipeline. Stages persist and stream large, ordered collections
//! of instrument records (scans, extracted features, feature sets) without
//! holding the whole dataset in memory, or keep them resident for small runs
//! and tests, behind one container contract.
//!
//! ## Key Features
//!
//! - **Append-only record store**: every record becomes one length-prefixed
//!   frame in a private file; its byte offset is the handle.
//!
//! - **Dual-backend containers**: file-backed and memory-backed variants of
//!   each container kind behave identically for `add`, `get`, iteration and
//!   finalization.
//!
//! - **Lazy iteration**: iterators resolve one frame at a time from a snapshot
//!   of the index.
//!
//! - **Derived chromatograms**: total-ion and base-peak series are accumulated
//!   while scans are appended and persisted once at finalization.
//!
//! - **Best-effort I/O**: a failed write or corrupt frame is logged and shows
//!   up as one missing record, never as a panic.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mzstore::prelude::*;
//!
//! // Pick the backend once, at the start of the pipeline
//! let factory = ContainerFactory::file(None);
//! let mut scans = factory.new_scan_container("run01")?;
//!
//! let scan = ScanBuilder::new(0)
//!     .msn(Msn::Ms1)
//!     .retention_time(60.0)
//!     .add_point(400.0, 10000.0)
//!     .add_point(500.0, 20000.0)
//!     .build();
//! scans.add(scan)?;
//!
//! // Persist chromatograms and make the store file durable
//! scans.finalize(None)?;
//!
//! let bpc = scans.base_peak_chromatogram();
//! for scan in scans.iter() {
//!     println!("scan {} at {}s", scan.index, scan.retention_time);
//! }
//! # Ok::<(), mzstore::container::ContainerError>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`record`]: scans, features, feature sets and chromatograms
//! - [`store`]: the append-only frame file and its handles
//! - [`container`]: container traits, backends, index and iterators
//! - [`factory`]: backend selection for pipeline stages
//! - [`config`]: TOML storage configuration
//! - [`inspect`]: offline frame-level verification of store files
//!
//! ## Store File Format
//!
//! A store file is a header-less sequence of frames:
//!
//! ```text
//! frame := length: u32 (big-endian) ++ payload: [u8; length]
//! ```
//!
//! The payload is the bincode (standard configuration) encoding of a
//! [`record::Record`], whose variant tag identifies the record kind.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod container;
pub mod factory;
pub mod inspect;
pub mod record;
pub mod store;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::container::{
        BackendKind, Container, ContainerError, FeatureContainer, FeatureSetContainer,
        FileFeatureContainer, FileFeatureSetContainer, FileScanContainer, MemoryFeatureContainer,
        MemoryFeatureSetContainer, MemoryScanContainer, RecordIter, ScanContainer, ScanInfo,
        ScanLevel,
    };
    pub use crate::factory::{Capability, ContainerFactory};
    pub use crate::record::{
        Chromatogram, ChromatogramKind, ExtendableRange, Feature, FeatureSet, IonMode, Msn,
        Record, RecordId, RecordKind, Scan, ScanBuilder, TracePoint, XyPoint,
    };
    pub use crate::store::{Handle, RecordStore, StoreConfig, StoreError};
}
