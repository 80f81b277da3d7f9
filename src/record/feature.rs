use serde::{Deserialize, Serialize};

use super::types::{ExtendableRange, XyPoint};
use super::RecordId;

/// One point of a feature trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    /// Retention time in seconds
    pub rt: f64,
    /// Observed m/z
    pub mz: f64,
    /// Observed intensity
    pub intensity: f64,
}

impl TracePoint {
    /// Create a new trace point
    pub fn new(rt: f64, mz: f64, intensity: f64) -> Self {
        Self { rt, mz, intensity }
    }
}

/// An extracted ion feature (profile) spanning several scans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature identifier, unique within a container
    pub id: RecordId,
    /// Intensity-weighted mean m/z
    pub mz: f64,
    /// Apex intensity
    pub intensity: f64,
    /// Retention time of the apex
    pub retention_time: f64,
    /// Trapezoidal area under the trace
    pub area: f64,
    /// Retention-time extent
    pub rt_range: ExtendableRange,
    /// m/z extent
    pub mz_range: ExtendableRange,
    /// Raw trace, ordered by retention time
    pub trace: Vec<TracePoint>,
}

impl Feature {
    /// Build a feature from its trace, deriving apex, centroid m/z and area
    ///
    /// Returns `None` for an empty trace.
    pub fn from_trace(id: RecordId, mut trace: Vec<TracePoint>) -> Option<Self> {
        trace.sort_by(|a, b| a.rt.total_cmp(&b.rt));
        let first = *trace.first()?;

        let mut rt_range = ExtendableRange::point(first.rt);
        let mut mz_range = ExtendableRange::point(first.mz);
        let mut apex = first;
        let mut weighted_mz = 0.0;
        let mut total = 0.0;
        let mut area = 0.0;

        for (i, point) in trace.iter().enumerate() {
            rt_range.extend_value(point.rt);
            mz_range.extend_value(point.mz);
            if point.intensity > apex.intensity {
                apex = *point;
            }
            weighted_mz += point.mz * point.intensity;
            total += point.intensity;
            if i > 0 {
                let prev = &trace[i - 1];
                area += (point.rt - prev.rt) * (point.intensity + prev.intensity) / 2.0;
            }
        }

        let mz = if total > 0.0 {
            weighted_mz / total
        } else {
            apex.mz
        };

        Some(Self {
            id,
            mz,
            intensity: apex.intensity,
            retention_time: apex.rt,
            area,
            rt_range,
            mz_range,
            trace,
        })
    }

    /// Apex as an (m/z, intensity) point
    pub fn apex(&self) -> XyPoint {
        XyPoint::new(self.mz, self.intensity)
    }
}

/// A group of co-eluting features, i.e. a pseudo-spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Set identifier, unique within a container
    pub index: RecordId,
    /// Mean apex retention time of the member features
    pub retention_time: f64,
    /// Union of the member features' retention-time ranges
    pub rt_range: ExtendableRange,
    /// (m/z, intensity) apex of each member, ordered by m/z
    pub data: Vec<XyPoint>,
    /// Most intense member apex
    pub base_peak: Option<XyPoint>,
    /// Member features
    pub features: Vec<Feature>,
}

impl FeatureSet {
    /// Group features into a set, deriving its spectrum and summary values
    pub fn new(index: RecordId, features: Vec<Feature>) -> Self {
        let mut data: Vec<XyPoint> = features.iter().map(Feature::apex).collect();
        data.sort_by(|a, b| a.x.total_cmp(&b.x));

        let base_peak = data
            .iter()
            .copied()
            .fold(None, |best: Option<XyPoint>, p| match best {
                Some(b) if b.y >= p.y => Some(b),
                _ => Some(p),
            });

        let mut rt_range: Option<ExtendableRange> = None;
        for feature in &features {
            match rt_range.as_mut() {
                Some(range) => range.extend_range(&feature.rt_range),
                None => rt_range = Some(feature.rt_range),
            }
        }

        let retention_time = if features.is_empty() {
            0.0
        } else {
            features.iter().map(|f| f.retention_time).sum::<f64>() / features.len() as f64
        };

        Self {
            index,
            retention_time,
            rt_range: rt_range.unwrap_or_else(|| ExtendableRange::point(retention_time)),
            data,
            base_peak,
            features,
        }
    }

    /// Look up a member feature by id
    pub fn feature(&self, id: RecordId) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Number of member features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the set has no members
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
