use std::fmt;

use serde::{Deserialize, Serialize};

/// A single (x, y) data point.
///
/// For scans `x` is m/z and `y` is intensity; for chromatograms `x` is the
/// retention time in seconds and `y` the summed or maximal intensity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XyPoint {
    /// Abscissa (m/z or time)
    pub x: f64,
    /// Ordinate (intensity)
    pub y: f64,
}

impl XyPoint {
    /// Create a new data point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for XyPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A closed numeric range that can be widened in place.
///
/// Used to track the m/z and retention-time envelope of an acquisition level
/// while scans are appended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtendableRange {
    lower: f64,
    upper: f64,
}

impl ExtendableRange {
    /// Create a range from two bounds, swapping them if given out of order
    pub fn new(lower: f64, upper: f64) -> Self {
        if lower <= upper {
            Self { lower, upper }
        } else {
            Self {
                lower: upper,
                upper: lower,
            }
        }
    }

    /// Create a zero-width range at `value`
    pub fn point(value: f64) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    /// Lower bound
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Width of the range
    pub fn size(&self) -> f64 {
        self.upper - self.lower
    }

    /// Midpoint of the range
    pub fn mean(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// Widen the range so that it contains `value`
    pub fn extend_value(&mut self, value: f64) {
        if value < self.lower {
            self.lower = value;
        }
        if value > self.upper {
            self.upper = value;
        }
    }

    /// Widen the range so that it contains `other`
    pub fn extend_range(&mut self, other: &ExtendableRange) {
        self.extend_value(other.lower);
        self.extend_value(other.upper);
    }

    /// Whether `value` lies within `[lower, upper]`
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl fmt::Display for ExtendableRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.4} - {:.4}]", self.lower, self.upper)
    }
}

/// MS acquisition level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Msn {
    /// Survey scan
    Ms1,
    /// Tandem MS
    Ms2,
    /// MS3
    Ms3,
    /// MS4
    Ms4,
    /// Any higher level
    Msn,
}

impl Msn {
    /// All acquisition levels in ascending order
    pub const ALL: [Msn; 5] = [Msn::Ms1, Msn::Ms2, Msn::Ms3, Msn::Ms4, Msn::Msn];

    /// Numeric MS level (`Msn` reports 5)
    pub fn level(&self) -> u8 {
        match self {
            Msn::Ms1 => 1,
            Msn::Ms2 => 2,
            Msn::Ms3 => 3,
            Msn::Ms4 => 4,
            Msn::Msn => 5,
        }
    }

    /// Map a numeric MS level onto an acquisition level
    ///
    /// Returns `None` for level 0; anything above 4 collapses into `Msn`.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => None,
            1 => Some(Msn::Ms1),
            2 => Some(Msn::Ms2),
            3 => Some(Msn::Ms3),
            4 => Some(Msn::Ms4),
            _ => Some(Msn::Msn),
        }
    }
}

impl fmt::Display for Msn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Msn::Msn => write!(f, "MSn"),
            other => write!(f, "MS{}", other.level()),
        }
    }
}

/// Ionization polarity of an acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IonMode {
    /// Positive ion mode
    Positive,
    /// Negative ion mode
    Negative,
    /// Simulated data
    InSilico,
    /// Neutral species
    Neutral,
    /// Polarity not recorded
    #[default]
    Unknown,
}

impl IonMode {
    /// Map an instrument polarity flag (1 / -1 / 0) onto an ion mode
    pub fn from_polarity(polarity: i8) -> Self {
        match polarity {
            p if p > 0 => IonMode::Positive,
            p if p < 0 => IonMode::Negative,
            _ => IonMode::Unknown,
        }
    }
}

impl fmt::Display for IonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IonMode::Positive => "positive",
            IonMode::Negative => "negative",
            IonMode::InSilico => "in-silico",
            IonMode::Neutral => "neutral",
            IonMode::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
