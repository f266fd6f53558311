//! Fill and NaN detection, 16-bit range checks and run-wide counters.

use std::fmt;

use nc2clm_io::OutputPrecision;

/// Absolute tolerance for matching a value against the fill value.
pub const FILL_TOLERANCE: f32 = 1e-4;

/// Classification of one raw source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// A regular value.
    Ok,
    /// Equal to the dataset's fill value within [`FILL_TOLERANCE`].
    Fill,
    /// Not a number.
    NaN,
}

impl Validity {
    /// Returns `true` for [`Validity::Ok`].
    pub fn is_valid(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "valid",
            Self::Fill => "fill",
            Self::NaN => "NaN",
        })
    }
}

/// Classifies `raw` against the dataset's fill value.
///
/// The fill comparison comes first, so a NaN fill value never matches and
/// NaN data is reported as [`Validity::NaN`].
pub fn validate(raw: f32, fill_value: f32) -> Validity {
    if (raw - fill_value).abs() < FILL_TOLERANCE {
        Validity::Fill
    } else if raw.is_nan() {
        Validity::NaN
    } else {
        Validity::Ok
    }
}

/// Returns `true` if `value` can be stored at `precision`.
///
/// Float output accepts everything. Short output rejects values below
/// `i16::MIN` or above `i16::MAX` before rounding.
pub fn range_check(value: f32, precision: OutputPrecision) -> bool {
    match precision {
        OutputPrecision::Float => true,
        OutputPrecision::Short => {
            value >= f32::from(i16::MIN) && value <= f32::from(i16::MAX)
        }
    }
}

/// Running totals of non-fatal value problems for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorCounters {
    fill: u64,
    range: u64,
}

impl ErrorCounters {
    /// Counts one fill or NaN value.
    pub fn record_fill(&mut self) {
        self.fill += 1;
    }

    /// Counts one value outside the 16-bit range.
    pub fn record_range(&mut self) {
        self.range += 1;
    }

    /// Number of fill or NaN values seen.
    pub fn fill(&self) -> u64 {
        self.fill
    }

    /// Number of out-of-range values seen.
    pub fn range(&self) -> u64 {
        self.range
    }

    /// Returns `true` if any value problem was counted.
    pub fn has_errors(&self) -> bool {
        self.fill > 0 || self.range > 0
    }
}

/// Minimum and maximum of one annual record, for the per-year summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    min: f32,
    max: f32,
    precision: OutputPrecision,
}

impl FieldRange {
    /// Creates an empty range.
    ///
    /// Short output starts from `i16::MAX / i16::MIN`, float output from
    /// `1e30 / -1e30`.
    pub fn new(precision: OutputPrecision) -> Self {
        let (min, max) = match precision {
            OutputPrecision::Short => (f32::from(i16::MAX), f32::from(i16::MIN)),
            OutputPrecision::Float => (1e30, -1e30),
        };
        Self {
            min,
            max,
            precision,
        }
    }

    /// Widens the range to include `value`. NaN is ignored.
    pub fn update(&mut self, value: f32) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Smallest value seen.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Largest value seen.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Number of decimals used to print values displayed with `scalar`.
    pub fn decimals(&self, scalar: f32) -> usize {
        let shown = self.max * scalar;
        if shown > 1e-1 {
            2
        } else if shown > 1e-3 {
            4
        } else {
            8
        }
    }

    /// Range as LPJmL will see it: stored values times `scalar`.
    ///
    /// Short output is rounded first, as it is stored.
    pub fn summary(&self, scalar: f32) -> String {
        let stored = |v: f32| match self.precision {
            OutputPrecision::Short => v.round(),
            OutputPrecision::Float => v,
        };
        let p = self.decimals(scalar);
        format!(
            "{:.p$} - {:.p$}",
            stored(self.min) * scalar,
            stored(self.max) * scalar
        )
    }
}
