//! Error types for nc2clm-io.

use std::path::PathBuf;

/// Error type for all fallible operations in the nc2clm-io crate.
///
/// Covers NetCDF inputs that cannot be opened or lack a required variable,
/// dimension or attribute, and failures while writing or inspecting CLM
/// output.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when a required variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a required dimension is not present in a file.
    #[error("dimension '{name}' not found in {}", path.display())]
    MissingDimension {
        /// Name of the missing dimension.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when the data variable has neither `_FillValue` nor
    /// `missing_value`.
    #[error("variable '{name}' in {} has neither _FillValue nor missing_value", path.display())]
    MissingFillValue {
        /// Name of the data variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when the data variable is not laid out as `(time, lat, lon)`.
    #[error("variable '{name}' has dimensions ({}), expected (time, lat, lon)", found.join(", "))]
    UnexpectedDimensions {
        /// Name of the data variable.
        name: String,
        /// Dimension names found on the variable.
        found: Vec<String>,
    },

    /// Returned when an annual record does not hold `n_cells x 365` values.
    #[error("record length mismatch: expected {expected} values, got {got}")]
    RecordLength {
        /// Expected number of values.
        expected: usize,
        /// Actual number of values.
        got: usize,
    },

    /// Returned when the output file cannot be created.
    #[error("cannot create {}: {reason}", path.display())]
    Create {
        /// Path of the output file.
        path: PathBuf,
        /// Description of the underlying I/O failure.
        reason: String,
    },

    /// Wraps a failure while writing or seeking the output stream.
    #[error("write error: {reason}")]
    Write {
        /// Description of the underlying I/O failure.
        reason: String,
    },

    /// Returned when a CLM stream does not start with a valid header.
    #[error("invalid CLM header: {reason}")]
    InvalidHeader {
        /// Description of the problem.
        reason: String,
    },
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Write {
            reason: e.to_string(),
        }
    }
}
