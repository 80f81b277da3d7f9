use serde::{Deserialize, Serialize};

use super::types::{ExtendableRange, IonMode, Msn, XyPoint};
use super::RecordId;

/// Precursor ion selected for fragmentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Precursor {
    /// Index of the parent scan
    pub parent_index: RecordId,
    /// Precursor m/z
    pub mz: f64,
    /// Precursor charge state, if known
    pub charge: Option<i16>,
    /// Precursor intensity, if known
    pub intensity: Option<f64>,
}

/// A single acquired scan
///
/// Statistics (`mz_range`, `base_peak`, `total_ion_current`) are computed once
/// at construction and travel with the record, so containers never need to
/// touch the data points to maintain their aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    /// Scan index, unique within a container
    pub index: RecordId,
    /// Acquisition level
    pub msn: Msn,
    /// Ionization polarity
    pub ion_mode: IonMode,
    /// Retention time in seconds
    pub retention_time: f64,
    /// Data points (m/z, intensity)
    pub data: Vec<XyPoint>,
    /// Observed m/z range
    pub mz_range: ExtendableRange,
    /// Most intense data point
    pub base_peak: Option<XyPoint>,
    /// Sum of all intensities
    pub total_ion_current: f64,
    /// Precursor information for MS2+ scans
    pub precursor: Option<Precursor>,
}

impl Scan {
    /// Create a scan and compute its statistics from the data points
    pub fn new(
        index: RecordId,
        msn: Msn,
        ion_mode: IonMode,
        retention_time: f64,
        data: Vec<XyPoint>,
    ) -> Self {
        let mut scan = Self {
            index,
            msn,
            ion_mode,
            retention_time,
            data,
            mz_range: ExtendableRange::point(0.0),
            base_peak: None,
            total_ion_current: 0.0,
            precursor: None,
        };
        scan.compute_statistics();
        scan
    }

    /// Recompute TIC, base peak and m/z range from the data points
    pub fn compute_statistics(&mut self) {
        let mut points = self.data.iter();
        let Some(first) = points.next() else {
            self.mz_range = ExtendableRange::point(0.0);
            self.base_peak = None;
            self.total_ion_current = 0.0;
            return;
        };

        let mut range = ExtendableRange::point(first.x);
        let mut tic = first.y;
        let mut base = *first;

        for point in points {
            range.extend_value(point.x);
            tic += point.y;
            if point.y > base.y {
                base = *point;
            }
        }

        self.mz_range = range;
        self.base_peak = Some(base);
        self.total_ion_current = tic;
    }

    /// Number of data points
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the scan has no data points
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Builder for constructing [`Scan`] records fluently
pub struct ScanBuilder {
    scan: Scan,
    mz_range: Option<ExtendableRange>,
}

impl ScanBuilder {
    /// Create a new MS1 scan builder
    pub fn new(index: RecordId) -> Self {
        Self {
            scan: Scan {
                index,
                msn: Msn::Ms1,
                ion_mode: IonMode::Unknown,
                retention_time: 0.0,
                data: Vec::new(),
                mz_range: ExtendableRange::point(0.0),
                base_peak: None,
                total_ion_current: 0.0,
                precursor: None,
            },
            mz_range: None,
        }
    }

    /// Set the acquisition level
    pub fn msn(mut self, msn: Msn) -> Self {
        self.scan.msn = msn;
        self
    }

    /// Set the ion mode
    pub fn ion_mode(mut self, ion_mode: IonMode) -> Self {
        self.scan.ion_mode = ion_mode;
        self
    }

    /// Set the retention time in seconds
    pub fn retention_time(mut self, rt: f64) -> Self {
        self.scan.retention_time = rt;
        self
    }

    /// Set precursor information for MS2+ scans
    pub fn precursor(mut self, parent_index: RecordId, mz: f64, charge: Option<i16>) -> Self {
        self.scan.precursor = Some(Precursor {
            parent_index,
            mz,
            charge,
            intensity: None,
        });
        self
    }

    /// Override the acquisition m/z window instead of deriving it from the data
    pub fn mz_range(mut self, lower: f64, upper: f64) -> Self {
        self.mz_range = Some(ExtendableRange::new(lower, upper));
        self
    }

    /// Set all data points at once
    pub fn data(mut self, data: Vec<XyPoint>) -> Self {
        self.scan.data = data;
        self
    }

    /// Add a single data point
    pub fn add_point(mut self, mz: f64, intensity: f64) -> Self {
        self.scan.data.push(XyPoint::new(mz, intensity));
        self
    }

    /// Build the scan, computing statistics automatically
    pub fn build(mut self) -> Scan {
        self.scan.compute_statistics();
        if let Some(range) = self.mz_range {
            self.scan.mz_range = range;
        }
        self.scan
    }
}
