//! Band layout of the 365-day annual record.

use std::ops::Range;

/// Number of daily bands in every annual record, regardless of calendar.
pub const BANDS_PER_YEAR: usize = 365;

/// Number of days in each month of the 365-day record (index 0 = January).
const DAYS_PER_MONTH: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// 0-based band on which February starts.
const FEBRUARY_START: usize = DAYS_PER_MONTH[0];

/// 0-based index of February 29 in a leap source year.
pub const LEAP_DAY_INDEX: usize = FEBRUARY_START + DAYS_PER_MONTH[1];

/// Bands that receive a share of a folded leap day: the 28 ordinary
/// February days, `31..59`.
pub const FOLD_BANDS: Range<usize> = FEBRUARY_START..LEAP_DAY_INDEX;
