use std::fmt;

use serde::{Deserialize, Serialize};

use super::chromatogram::Chromatogram;
use super::feature::{Feature, FeatureSet};
use super::scan::Scan;
use super::RecordId;

/// The closed set of record kinds a store can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    /// [`Scan`]
    Scan,
    /// [`Feature`]
    Feature,
    /// [`FeatureSet`]
    FeatureSet,
    /// [`Chromatogram`]
    Chromatogram,
}

impl RecordKind {
    /// All record kinds, in frame tag order
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Scan,
        RecordKind::Feature,
        RecordKind::FeatureSet,
        RecordKind::Chromatogram,
    ];
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Scan => "scan",
            RecordKind::Feature => "feature",
            RecordKind::FeatureSet => "feature-set",
            RecordKind::Chromatogram => "chromatogram",
        };
        f.write_str(s)
    }
}

/// A decoded frame payload of any kind
///
/// The variant order is the on-disk tag order and must never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    /// A scan
    Scan(Scan),
    /// A feature
    Feature(Feature),
    /// A feature set
    FeatureSet(FeatureSet),
    /// A derived chromatogram
    Chromatogram(Chromatogram),
}

impl Record {
    /// Kind tag of this record
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Scan(_) => RecordKind::Scan,
            Record::Feature(_) => RecordKind::Feature,
            Record::FeatureSet(_) => RecordKind::FeatureSet,
            Record::Chromatogram(_) => RecordKind::Chromatogram,
        }
    }
}

/// Borrowed view of a record, encoded exactly like [`Record`]
///
/// Lets the store serialize a record without cloning it.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum RecordRef<'a> {
    /// A scan
    Scan(&'a Scan),
    /// A feature
    Feature(&'a Feature),
    /// A feature set
    FeatureSet(&'a FeatureSet),
    /// A derived chromatogram
    Chromatogram(&'a Chromatogram),
}

/// A record type that can be written to and read from a record store
pub trait StoredRecord: Clone + Send + Sync + 'static {
    /// Frame tag for this type
    const KIND: RecordKind;

    /// Borrow as an encodable frame payload
    fn to_ref(&self) -> RecordRef<'_>;

    /// Unwrap a decoded payload, handing it back if the kind does not match
    fn from_record(record: Record) -> Result<Self, Record>;
}

/// A stored record that containers index by id and retention time
pub trait IndexedRecord: StoredRecord {
    /// Identifier, unique within a container
    fn id(&self) -> RecordId;

    /// Secondary ordering key
    fn retention_time(&self) -> f64;
}

macro_rules! stored_record {
    ($ty:ident) => {
        impl StoredRecord for $ty {
            const KIND: RecordKind = RecordKind::$ty;

            fn to_ref(&self) -> RecordRef<'_> {
                RecordRef::$ty(self)
            }

            fn from_record(record: Record) -> Result<Self, Record> {
                match record {
                    Record::$ty(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    };
}

stored_record!(Scan);
stored_record!(Feature);
stored_record!(FeatureSet);
stored_record!(Chromatogram);

impl IndexedRecord for Scan {
    fn id(&self) -> RecordId {
        self.index
    }

    fn retention_time(&self) -> f64 {
        self.retention_time
    }
}

impl IndexedRecord for Feature {
    fn id(&self) -> RecordId {
        self.id
    }

    fn retention_time(&self) -> f64 {
        self.retention_time
    }
}

impl IndexedRecord for FeatureSet {
    fn id(&self) -> RecordId {
        self.index
    }

    fn retention_time(&self) -> f64 {
        self.retention_time
    }
}
