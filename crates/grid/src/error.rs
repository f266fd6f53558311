//! Error types for nc2clm-grid.

use std::fmt;
use std::path::PathBuf;

/// A simulation cell whose coordinates are missing from a dataset's axes.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedCell {
    /// Position of the cell in the grid file.
    pub cell: usize,
    /// Physical longitude searched for.
    pub lon: f64,
    /// Physical latitude searched for.
    pub lat: f64,
    /// Whether the longitude axis contained a match.
    pub lon_found: bool,
    /// Whether the latitude axis contained a match.
    pub lat_found: bool,
}

impl fmt::Display for UnresolvedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cell {} ({:.2} E {:.2} N)",
            self.cell, self.lon, self.lat
        )?;
        match (self.lon_found, self.lat_found) {
            (false, false) => f.write_str(" lon and lat missing"),
            (false, true) => f.write_str(" lon missing"),
            (true, false) => f.write_str(" lat missing"),
            (true, true) => Ok(()),
        }
    }
}

/// Error type for all fallible operations in the nc2clm-grid crate.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The grid file could not be read from disk.
    #[error("cannot read grid file {}: {reason}", path.display())]
    Read {
        /// Path of the grid file.
        path: PathBuf,
        /// Description of the underlying I/O failure.
        reason: String,
    },

    /// The version field is invalid in both byte orders.
    #[error("cannot determine byte order of grid file (version field {raw_version:#010x})")]
    UndeterminedEndian {
        /// The version field as read in native order.
        raw_version: u32,
    },

    /// The grid file ended before the header or all cell coordinates.
    #[error("grid file truncated: expected {expected} bytes, got {got}")]
    Truncated {
        /// Number of bytes required.
        expected: usize,
        /// Number of bytes available.
        got: usize,
    },

    /// The header announces a negative number of cells.
    #[error("invalid cell count in grid header: {n_cells}")]
    InvalidCellCount {
        /// The cell count found in the header.
        n_cells: i32,
    },

    /// One or more simulation cells have no matching dataset coordinate.
    #[error("{} grid cell(s) not found in dataset: {}", cells.len(), list_cells(cells))]
    Mismatch {
        /// Every unresolved cell, in grid order.
        cells: Vec<UnresolvedCell>,
    },
}

fn list_cells(cells: &[UnresolvedCell]) -> String {
    cells
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
