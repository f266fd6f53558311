//! Proleptic Gregorian leap-year rule.

/// Returns `true` if `year` is a leap year in the proleptic Gregorian
/// calendar.
///
/// # Examples
///
/// ```ignore
/// assert!(is_leap_year(2000));
/// assert!(!is_leap_year(1900));
/// assert!(is_leap_year(2004));
/// ```
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the number of source days in `year`: 366 for leap years, 365
/// otherwise.
pub fn year_length(year: i32) -> usize {
    if is_leap_year(year) { 366 } else { 365 }
}
