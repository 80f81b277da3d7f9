use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::record::{Chromatogram, ChromatogramKind, Msn, RecordId, Scan, XyPoint};
use crate::store::Handle;

use super::backend::Slot;

/// What one scan contributes to the chromatograms
#[derive(Debug, Clone, Copy)]
struct SeriesPoint {
    msn: Msn,
    time: f64,
    base_peak: Option<f64>,
    total_ion: f64,
}

/// Base-peak and total-ion contributions accumulated while scans are appended
///
/// Points are keyed by scan id in insertion order, so a re-added scan
/// replaces its earlier contribution in place.
#[derive(Debug, Default)]
pub(crate) struct SeriesBuffer {
    points: Vec<SeriesPoint>,
    position: HashMap<RecordId, usize>,
}

impl SeriesBuffer {
    /// Add or replace the contribution of one scan
    pub(crate) fn record(&mut self, scan: &Scan) {
        let point = SeriesPoint {
            msn: scan.msn,
            time: scan.retention_time,
            base_peak: scan.base_peak.map(|p| p.y),
            total_ion: scan.total_ion_current,
        };
        match self.position.get(&scan.index) {
            Some(&pos) => self.points[pos] = point,
            None => {
                self.position.insert(scan.index, self.points.len());
                self.points.push(point);
            }
        }
    }

    /// Build the BPC, then one TIC per level
    ///
    /// Only MS1 scans with at least one data point feed the BPC.
    pub(crate) fn chromatograms(&self) -> (Chromatogram, Vec<Chromatogram>) {
        let mut base_peak = Vec::new();
        let mut total_ion: BTreeMap<Msn, Vec<XyPoint>> = BTreeMap::new();

        for point in &self.points {
            if point.msn == Msn::Ms1 {
                if let Some(intensity) = point.base_peak {
                    base_peak.push(XyPoint::new(point.time, intensity));
                }
            }
            total_ion
                .entry(point.msn)
                .or_default()
                .push(XyPoint::new(point.time, point.total_ion));
        }

        let bpc = Chromatogram::new(ChromatogramKind::BasePeak, Msn::Ms1, base_peak);
        let tics = total_ion
            .into_iter()
            .map(|(msn, points)| Chromatogram::new(ChromatogramKind::TotalIon, msn, points))
            .collect();
        (bpc, tics)
    }
}

/// Where the finalized chromatograms of a scan container live
#[derive(Debug, Default)]
pub(crate) struct AggregateSlots {
    pub(crate) base_peak: Option<Slot<Chromatogram>>,
    pub(crate) total_ion: BTreeMap<Msn, Slot<Chromatogram>>,
}

impl AggregateSlots {
    pub(crate) fn handles(&self) -> AggregateHandles {
        AggregateHandles {
            base_peak: self
                .base_peak
                .as_ref()
                .map_or(Handle::INVALID, Slot::handle),
            total_ion: self
                .total_ion
                .iter()
                .map(|(&msn, slot)| TicHandle {
                    msn,
                    handle: slot.handle(),
                })
                .collect(),
        }
    }

    pub(crate) fn from_handles(handles: &AggregateHandles) -> Self {
        Self {
            base_peak: handles
                .base_peak
                .is_valid()
                .then_some(Slot::Stored(handles.base_peak)),
            total_ion: handles
                .total_ion
                .iter()
                .map(|t| (t.msn, Slot::Stored(t.handle)))
                .collect(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.base_peak = None;
        self.total_ion.clear();
    }
}

/// Store handles of a scan container's chromatograms
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateHandles {
    /// Base-peak chromatogram
    pub base_peak: Handle,
    /// Total-ion chromatogram per acquisition level
    pub total_ion: Vec<TicHandle>,
}

/// Handle of one level's total-ion chromatogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicHandle {
    /// Acquisition level
    pub msn: Msn,
    /// Frame handle
    pub handle: Handle,
}
