//! Error types for nc2clm-pipeline.

use nc2clm_grid::GridError;
use nc2clm_io::IoError;

/// Process exit status for a grid error.
pub const EXIT_GRID_ERROR: u8 = 2;

/// Process exit status for a dataset, allocation or output error.
pub const EXIT_FILE_ERROR: u8 = 3;

/// Process exit status for a run that finished with fill, NaN or range
/// warnings.
pub const EXIT_VALUE_WARNINGS: u8 = 4;

/// Process exit status for an invalid run description.
pub const EXIT_USAGE_ERROR: u8 = 1;

/// Error type for all fallible operations in the nc2clm-pipeline crate.
///
/// Every variant is fatal for the run. Invalid data values are not errors;
/// they are counted in [`crate::ErrorCounters`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Grid file error or unresolvable simulation cell.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Dataset or output stream error.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Returned when a working buffer cannot be allocated.
    #[error("cannot allocate {what} buffer of {len} values: {reason}")]
    Allocation {
        /// Which buffer failed.
        what: &'static str,
        /// Number of values requested.
        len: usize,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}

impl PipelineError {
    /// Returns `true` for grid file and grid mismatch errors.
    pub fn is_grid_error(&self) -> bool {
        matches!(self, Self::Grid(_))
    }

    /// Returns `true` for dataset, allocation and output errors.
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Allocation { .. })
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Grid(_) => EXIT_GRID_ERROR,
            Self::Io(_) | Self::Allocation { .. } => EXIT_FILE_ERROR,
            Self::InvalidConfig { .. } => EXIT_USAGE_ERROR,
        }
    }
}
