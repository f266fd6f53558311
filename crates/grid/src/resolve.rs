//! Grid Index Resolver: simulation cells to dataset axis indices.

use crate::cells::GridCell;
use crate::error::{GridError, UnresolvedCell};

/// Absolute tolerance for coordinate equality, in degrees.
pub const COORD_TOLERANCE: f64 = 1e-4;

/// Returns `true` if `a` and `b` differ by less than [`COORD_TOLERANCE`].
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < COORD_TOLERANCE
}

/// Position of one simulation cell on a dataset's `lon` and `lat` axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex {
    /// Index on the longitude axis.
    pub lon: usize,
    /// Index on the latitude axis.
    pub lat: usize,
}

impl CellIndex {
    /// Offset of this cell inside one `lat x lon` time slice.
    pub fn offset(self, lon_len: usize) -> usize {
        self.lat * lon_len + self.lon
    }
}

/// Axis indices of every simulation cell for one dataset, in grid order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateIndexMap {
    indices: Vec<CellIndex>,
}

/// Index of the last axis value within tolerance of `target`.
fn last_match(axis: &[f64], target: f64) -> Option<usize> {
    let mut found = None;
    for (i, &value) in axis.iter().enumerate() {
        if approx_equal(target, value) {
            found = Some(i);
        }
    }
    found
}

impl CoordinateIndexMap {
    /// Resolves every cell against a dataset's coordinate axes.
    ///
    /// Longitude and latitude are matched independently. Each axis is
    /// scanned completely; when several positions match, the last one wins.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Mismatch`] listing every cell with no match on
    /// either axis.
    pub fn resolve(
        cells: &[GridCell],
        lons: &[f64],
        lats: &[f64],
        scale: f64,
    ) -> Result<Self, GridError> {
        let mut indices = Vec::with_capacity(cells.len());
        let mut unresolved = Vec::new();

        for (id, cell) in cells.iter().enumerate() {
            let lon = cell.lon(scale);
            let lat = cell.lat(scale);
            match (last_match(lons, lon), last_match(lats, lat)) {
                (Some(ilon), Some(ilat)) => indices.push(CellIndex {
                    lon: ilon,
                    lat: ilat,
                }),
                (ilon, ilat) => unresolved.push(UnresolvedCell {
                    cell: id,
                    lon,
                    lat,
                    lon_found: ilon.is_some(),
                    lat_found: ilat.is_some(),
                }),
            }
        }

        if !unresolved.is_empty() {
            return Err(GridError::Mismatch { cells: unresolved });
        }
        Ok(Self { indices })
    }

    /// Returns the index pair of cell `cell`.
    pub fn get(&self, cell: usize) -> Option<CellIndex> {
        self.indices.get(cell).copied()
    }

    /// Returns all index pairs in grid order.
    pub fn as_slice(&self) -> &[CellIndex] {
        &self.indices
    }

    /// Returns the number of resolved cells.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the map holds no cells.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
