//! Assembly of one annual record from a year of source slices.

use std::path::Path;

use nc2clm_calendar::{BANDS_PER_YEAR, DayPlan, DaySlot, FOLD_BANDS};
use nc2clm_grid::{CoordinateIndexMap, GridCell};
use nc2clm_io::OutputPrecision;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::transform::Transform;
use crate::validate::{ErrorCounters, FieldRange, Validity, range_check, validate};

/// Allocates a zeroed buffer of `len` values without aborting on failure.
pub(crate) fn try_alloc(what: &'static str, len: usize) -> Result<Vec<f32>, PipelineError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| PipelineError::Allocation {
            what,
            len,
            reason: e.to_string(),
        })?;
    buf.resize(len, 0.0);
    Ok(buf)
}

/// One source year as seen by [`AnnualRecord::build`].
#[derive(Debug, Clone, Copy)]
pub struct YearInput<'a> {
    /// Day mapping of the year.
    pub plan: &'a DayPlan,
    /// Source values laid out `[day][lat][lon]`, at least
    /// `plan.source_days()` slices long.
    pub source: &'a [f32],
    /// Values per `lat x lon` slice.
    pub slice_len: usize,
    /// Length of the longitude axis.
    pub lon_len: usize,
    /// Axis indices of every simulation cell.
    pub map: &'a CoordinateIndexMap,
    /// Simulation cells, for log messages.
    pub cells: &'a [GridCell],
    /// Factor from stored cell coordinates to degrees, for log messages.
    pub coord_scale: f64,
    /// Fill value of the dataset.
    pub fill_value: f32,
    /// Offset and scale.
    pub transform: Transform,
    /// Output precision, for range checks.
    pub precision: OutputPrecision,
    /// Dataset path, for log messages.
    pub path: &'a Path,
}

/// Dense `n_cells x 365` record of transformed values, reused every year.
#[derive(Debug, Clone)]
pub struct AnnualRecord {
    n_cells: usize,
    values: Vec<f32>,
}

impl AnnualRecord {
    /// Allocates a zeroed record for `n_cells` cells.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Allocation`] if the buffer cannot be
    /// reserved.
    pub fn try_new(n_cells: usize) -> Result<Self, PipelineError> {
        let len = n_cells
            .checked_mul(BANDS_PER_YEAR)
            .ok_or_else(|| PipelineError::Allocation {
                what: "annual record",
                len: usize::MAX,
                reason: "cell count overflows".to_string(),
            })?;
        Ok(Self {
            n_cells,
            values: try_alloc("annual record", len)?,
        })
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// All values, cell by cell, 365 bands each.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// The 365 bands of one cell.
    ///
    /// # Panics
    ///
    /// Panics if `cell >= self.n_cells()`.
    pub fn cell(&self, cell: usize) -> &[f32] {
        &self.values[cell * BANDS_PER_YEAR..(cell + 1) * BANDS_PER_YEAR]
    }

    /// Rebuilds the record from one source year.
    ///
    /// Every mapped source day is validated; fill and NaN values are
    /// counted and logged but still transformed and written. Values of a
    /// folded leap day are spread over the February bands unless they equal
    /// the fill value.
    /// Values written to a band are range checked for 16-bit output unless
    /// already flagged invalid.
    ///
    /// Returns the range of the finished record.
    pub fn build(&mut self, input: &YearInput<'_>, counters: &mut ErrorCounters) -> FieldRange {
        self.values.fill(0.0);
        let year = input.plan.year();

        for (cell, index) in input.map.as_slice().iter().enumerate() {
            let offset = index.offset(input.lon_len);
            let lon = input.cells[cell].lon(input.coord_scale);
            let lat = input.cells[cell].lat(input.coord_scale);
            let row = &mut self.values[cell * BANDS_PER_YEAR..(cell + 1) * BANDS_PER_YEAR];

            for (day, slot) in input.plan.iter() {
                if slot == DaySlot::Drop {
                    continue;
                }
                let raw = input.source[day * input.slice_len + offset];
                let validity = validate(raw, input.fill_value);
                if !validity.is_valid() {
                    counters.record_fill();
                    warn!(
                        file = %input.path.display(),
                        cell,
                        lon,
                        lat,
                        day,
                        year,
                        "{validity} value in source data"
                    );
                }

                match slot {
                    DaySlot::Band(band) => {
                        let value = input.transform.apply(raw);
                        row[band] = value;
                        if validity.is_valid() && !range_check(value, input.precision) {
                            counters.record_range();
                            warn!(
                                file = %input.path.display(),
                                cell,
                                ilon = index.lon,
                                ilat = index.lat,
                                lon,
                                lat,
                                day,
                                year,
                                value,
                                "value out of 16-bit range"
                            );
                        }
                    }
                    DaySlot::Fold => {
                        if cell == 0 {
                            info!(year, "distributing leap day values over February");
                        }
                        if validity != Validity::Fill {
                            let share = input.transform.fold_share(raw);
                            for band in FOLD_BANDS {
                                row[band] += share;
                            }
                        }
                    }
                    DaySlot::Drop => {}
                }
            }
        }

        let mut range = FieldRange::new(input.precision);
        for &v in &self.values {
            range.update(v);
        }
        range
    }
}
