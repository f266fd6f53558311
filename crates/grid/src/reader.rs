//! Grid-definition file reader.

use std::path::Path;

use tracing::{debug, warn};

use crate::cells::GridCell;
use crate::error::GridError;
use crate::header::{ByteOrder, GRID_HEADER_SIZE, GridHeader};

/// Magic bytes at the start of an LPJmL grid file.
pub const GRID_MAGIC: &[u8; 7] = b"LPJGRID";

/// Contents of a grid-definition file, normalised to native values.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinition {
    header: GridHeader,
    byte_order: ByteOrder,
    cells: Vec<GridCell>,
}

impl GridDefinition {
    /// Builds a definition from a header and cells, using `byte_order` when
    /// encoded. `header.n_cells` is set to the number of cells.
    pub fn new(mut header: GridHeader, byte_order: ByteOrder, cells: Vec<GridCell>) -> Self {
        header.n_cells = i32::try_from(cells.len()).unwrap_or(i32::MAX);
        Self {
            header,
            byte_order,
            cells,
        }
    }

    /// Parses a complete grid file image.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Truncated`] if the image is shorter than the
    /// header and announced cells, [`GridError::UndeterminedEndian`] if the
    /// byte order cannot be detected, or [`GridError::InvalidCellCount`] for
    /// a negative cell count.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GridError> {
        let magic_len = GRID_MAGIC.len();
        let cells_at = magic_len + GRID_HEADER_SIZE;
        let raw: &[u8; GRID_HEADER_SIZE] = bytes
            .get(magic_len..cells_at)
            .and_then(|b| b.try_into().ok())
            .ok_or(GridError::Truncated {
                expected: cells_at,
                got: bytes.len(),
            })?;

        if &bytes[..magic_len] != GRID_MAGIC {
            warn!(
                magic = %String::from_utf8_lossy(&bytes[..magic_len]),
                "unexpected grid file magic"
            );
        }

        let (header, byte_order) = GridHeader::normalize(raw)?;
        if byte_order.is_swapped() {
            debug!(?byte_order, "grid file is byte-swapped");
        }

        let n_cells = header.cell_count()?;
        let end = cells_at + n_cells * 4;
        let coords = bytes.get(cells_at..end).ok_or(GridError::Truncated {
            expected: end,
            got: bytes.len(),
        })?;

        Ok(Self {
            header,
            byte_order,
            cells: GridCell::decode_all(coords, byte_order),
        })
    }

    /// Encodes the definition as a grid file image in its byte order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(GRID_MAGIC.len() + GRID_HEADER_SIZE + self.cells.len() * 4);
        out.extend_from_slice(GRID_MAGIC);
        out.extend_from_slice(&self.header.encode(self.byte_order));
        for cell in &self.cells {
            cell.encode_into(self.byte_order, &mut out);
        }
        out
    }

    /// Returns the normalised header.
    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    /// Returns the byte order the file was stored in.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Returns the cells in canonical grid order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Returns the number of simulation cells.
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }
}

/// Reads and normalises a grid-definition file.
///
/// # Errors
///
/// Returns [`GridError::Read`] if the file cannot be read, otherwise the
/// errors of [`GridDefinition::from_bytes`].
pub fn read_grid_file(path: &Path) -> Result<GridDefinition, GridError> {
    let bytes = std::fs::read(path).map_err(|e| GridError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let grid = GridDefinition::from_bytes(&bytes)?;
    debug!(
        path = %path.display(),
        n_cells = grid.n_cells(),
        cell_size = grid.header().cell_size,
        "grid file loaded"
    );
    Ok(grid)
}
