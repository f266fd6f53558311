//! Per-year precomputed day mapping.

use crate::band::BANDS_PER_YEAR;
use crate::kind::VariableKind;
use crate::leap::{is_leap_year, year_length};
use crate::mapping::{DaySlot, day_mapping};

/// The [`DaySlot`] of every source day of one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlan {
    year: i32,
    is_leap: bool,
    slots: Vec<DaySlot>,
}

impl DayPlan {
    /// Builds the plan for `year` and variable `kind`.
    pub fn new(year: i32, kind: VariableKind) -> Self {
        let is_leap = is_leap_year(year);
        let slots = (0..year_length(year))
            .filter_map(|d| day_mapping(d, is_leap, kind).ok())
            .collect();
        Self {
            year,
            is_leap,
            slots,
        }
    }

    /// Returns the calendar year of this plan.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns `true` if the plan covers a leap year.
    pub fn is_leap(&self) -> bool {
        self.is_leap
    }

    /// Returns the number of source days read for this year (365 or 366).
    pub fn source_days(&self) -> usize {
        self.slots.len()
    }

    /// Returns the slot of a 0-based source day.
    ///
    /// # Panics
    ///
    /// Panics if `source_day >= self.source_days()`.
    pub fn slot(&self, source_day: usize) -> DaySlot {
        self.slots[source_day]
    }

    /// Iterates over `(source_day, slot)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, DaySlot)> + '_ {
        self.slots.iter().copied().enumerate()
    }

    /// Number of bands written directly by this plan. Always
    /// [`BANDS_PER_YEAR`].
    pub fn band_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, DaySlot::Band(_)))
            .count()
    }
}
