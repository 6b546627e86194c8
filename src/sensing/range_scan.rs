use chrono::{DateTime, Utc};

/// Bin assigned to readings without a return (`+inf`).
pub const NO_RETURN_BIN: u16 = 6;
/// Bin assigned to invalid readings (`NaN`).
pub const INVALID_BIN: u16 = 0;

/// One sweep of the ranging sensor, one reading per angular bin.
///
/// Readings are either a finite distance, `+inf` for "no return" or `NaN` for an
/// invalid measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeScan {
    stamp: DateTime<Utc>,
    ranges: Vec<f64>,
}

/// The decimated scan handed to discrete-state learners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscretizedScan {
    pub bins: Vec<u16>,
    /// Whether any raw reading, sampled or not, lies inside the proximity limit.
    pub proximity_alert: bool,
}

impl RangeScan {
    pub fn new(stamp: DateTime<Utc>, ranges: Vec<f64>) -> Self { Self { stamp, ranges } }

    pub fn stamp(&self) -> DateTime<Utc> { self.stamp }
    pub fn ranges(&self) -> &[f64] { &self.ranges }

    /// Smallest valid reading. `NaN` readings are skipped, so a scan without any valid
    /// reading reports `+inf`.
    pub fn min_range(&self) -> f64 { self.ranges.iter().copied().fold(f64::INFINITY, f64::min) }

    /// Whether some reading `r` satisfies `0 < r < limit`.
    pub fn has_return_within(&self, limit: f64) -> bool {
        self.ranges.iter().any(|r| *r > 0.0 && *r < limit)
    }

    /// Decimates the scan to roughly `bins` integer readings.
    ///
    /// Every `len / bins`-th reading is kept: `+inf` maps to [`NO_RETURN_BIN`], `NaN` to
    /// [`INVALID_BIN`] and finite readings are truncated to whole distance units. The
    /// proximity check runs over *all* raw readings.
    ///
    /// # Arguments
    /// * `bins` - Target number of bins, `None` keeps every reading.
    /// * `proximity` - Distance below which the episode counts as crashed.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn discretize(&self, bins: Option<usize>, proximity: f64) -> DiscretizedScan {
        let n_bins = bins.unwrap_or(self.ranges.len()).max(1);
        let stride = (self.ranges.len() / n_bins).max(1);
        let bins = self
            .ranges
            .iter()
            .step_by(stride)
            .map(|r| {
                if r.is_nan() {
                    INVALID_BIN
                } else if *r == f64::INFINITY {
                    NO_RETURN_BIN
                } else {
                    // saturating cast: negative readings land in 0
                    r.trunc() as u16
                }
            })
            .collect();
        DiscretizedScan { bins, proximity_alert: self.has_return_within(proximity) }
    }
}
