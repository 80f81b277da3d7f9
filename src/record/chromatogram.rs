use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::{Msn, XyPoint};

/// Kind of derived chromatogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChromatogramKind {
    /// Total ion current (TIC)
    TotalIon,
    /// Base peak intensity (BPC)
    BasePeak,
}

impl fmt::Display for ChromatogramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChromatogramKind::TotalIon => f.write_str("TIC"),
            ChromatogramKind::BasePeak => f.write_str("BPC"),
        }
    }
}

/// A (time, intensity) trace derived from a scan collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromatogram {
    /// Chromatogram identifier, e.g. `"TIC MS1"`
    pub id: String,
    /// Derivation
    pub kind: ChromatogramKind,
    /// Acquisition level the points were taken from
    pub msn: Msn,
    /// (retention time, intensity) points in acquisition order
    pub data: Vec<XyPoint>,
}

impl Chromatogram {
    /// Create a new chromatogram, naming it after its kind and level
    pub fn new(kind: ChromatogramKind, msn: Msn, data: Vec<XyPoint>) -> Self {
        Self {
            id: format!("{kind} {msn}"),
            kind,
            msn,
            data,
        }
    }

    /// Number of data points
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the chromatogram has no points
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Retention times, in order
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().map(|p| p.x)
    }

    /// Intensities, in order
    pub fn intensities(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().map(|p| p.y)
    }
}
