//! # nc2clm-grid
//!
//! Read LPJmL grid-definition files (`LPJGRID`) and resolve their cells
//! against the coordinate axes of a NetCDF dataset.
//!
//! The grid file stores its header and cell coordinates in the byte order of
//! the machine that wrote it. [`GridHeader::normalize`] detects that order
//! once from the version field; everything downstream works on native values.

mod cells;
mod error;
mod header;
mod reader;
mod resolve;

pub use cells::{CoordinateScale, GridCell};
pub use error::{GridError, UnresolvedCell};
pub use header::{ByteOrder, GRID_HEADER_SIZE, GridHeader};
pub use reader::{GRID_MAGIC, GridDefinition, read_grid_file};
pub use resolve::{COORD_TOLERANCE, CellIndex, CoordinateIndexMap, approx_equal};
