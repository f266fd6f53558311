//! Source day to output band mapping.

use crate::band::{BANDS_PER_YEAR, LEAP_DAY_INDEX};
use crate::error::CalendarError;
use crate::kind::VariableKind;

/// Destination of one source day in the 365-band annual record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DaySlot {
    /// The value is written to this 0-based band.
    Band(usize),
    /// The value is spread over the February bands
    /// ([`FOLD_BANDS`](crate::FOLD_BANDS)) and takes no band of its own.
    Fold,
    /// The value does not reach the record.
    Drop,
}

/// Maps a 0-based source day onto the 365-band record.
///
/// - Non-leap years: day `d` goes to band `d`.
/// - Leap years, precipitation: day `d` goes to band `d`; the 366th day
///   (index 365) is dropped.
/// - Leap years, other variables: day 59 (February 29) is folded, later
///   days shift down by one band.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidSourceDay`] if `source_day` is not a day
/// of a 365-day (or, for leap years, 366-day) year.
pub fn day_mapping(
    source_day: usize,
    is_leap: bool,
    kind: VariableKind,
) -> Result<DaySlot, CalendarError> {
    let year_length = if is_leap { 366 } else { 365 };
    if source_day >= year_length {
        return Err(CalendarError::InvalidSourceDay {
            day: source_day,
            year_length,
        });
    }

    if !is_leap {
        return Ok(DaySlot::Band(source_day));
    }

    let slot = match kind {
        VariableKind::Precipitation if source_day < BANDS_PER_YEAR => DaySlot::Band(source_day),
        VariableKind::Precipitation => DaySlot::Drop,
        VariableKind::Other if source_day < LEAP_DAY_INDEX => DaySlot::Band(source_day),
        VariableKind::Other if source_day == LEAP_DAY_INDEX => DaySlot::Fold,
        VariableKind::Other => DaySlot::Band(source_day - 1),
    };
    Ok(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_leap_is_identity() {
        for kind in [VariableKind::Precipitation, VariableKind::Other] {
            for d in 0..365 {
                assert_eq!(day_mapping(d, false, kind).unwrap(), DaySlot::Band(d));
            }
        }
    }

    #[test]
    fn non_leap_rejects_day_365() {
        assert_eq!(
            day_mapping(365, false, VariableKind::Other).unwrap_err(),
            CalendarError::InvalidSourceDay {
                day: 365,
                year_length: 365,
            }
        );
    }

    #[test]
    fn leap_other_folds_day_59() {
        let kind = VariableKind::Other;
        assert_eq!(day_mapping(58, true, kind).unwrap(), DaySlot::Band(58));
        assert_eq!(day_mapping(59, true, kind).unwrap(), DaySlot::Fold);
        assert_eq!(day_mapping(60, true, kind).unwrap(), DaySlot::Band(59));
        assert_eq!(day_mapping(365, true, kind).unwrap(), DaySlot::Band(364));
    }

    #[test]
    fn leap_precipitation_keeps_day_59_and_drops_last() {
        let kind = VariableKind::Precipitation;
        assert_eq!(day_mapping(59, true, kind).unwrap(), DaySlot::Band(59));
        assert_eq!(day_mapping(364, true, kind).unwrap(), DaySlot::Band(364));
        assert_eq!(day_mapping(365, true, kind).unwrap(), DaySlot::Drop);
    }

    #[test]
    fn leap_rejects_day_366() {
        assert!(day_mapping(366, true, VariableKind::Precipitation).is_err());
    }
}
