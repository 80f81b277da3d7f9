//! # Record Model
//!
//! The records that flow between pipeline stages and are persisted by the
//! store: scans, extracted features, feature sets and the chromatograms
//! derived from a scan collection.
//!
//! Every persisted record is one variant of the closed [`Record`] union. The
//! variant tag is written into each frame, so a reader asking for the wrong
//! kind gets a detectable mismatch instead of garbage.

mod chromatogram;
mod feature;
mod kind;
mod scan;
mod types;


/// Identifier of a record within its container
pub type RecordId = i64;

pub use chromatogram::{Chromatogram, ChromatogramKind};
pub use feature::{Feature, FeatureSet, TracePoint};
pub use kind::{IndexedRecord, Record, RecordKind, RecordRef, StoredRecord};
pub use scan::{Precursor, Scan, ScanBuilder};
pub use types::{ExtendableRange, IonMode, Msn, XyPoint};
