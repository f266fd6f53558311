//! Error types for the nc2clm-calendar crate.

/// Error type for all fallible operations in the nc2clm-calendar crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a source day index lies outside the source year.
    #[error("invalid source day: {day} (year has {year_length} days)")]
    InvalidSourceDay {
        /// The 0-based source day that was provided.
        day: usize,
        /// Number of days in the source year (365 or 366).
        year_length: usize,
    },
}
