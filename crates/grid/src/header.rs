//! Grid header layout and byte-order detection.

use crate::error::GridError;

/// Size in bytes of the header that follows the 7-byte magic: seven `i32`
/// fields and two `f32` fields.
pub const GRID_HEADER_SIZE: usize = 36;

/// Byte order of a binary LPJmL file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl ByteOrder {
    /// Byte order of the running machine.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::Little
        } else {
            Self::Big
        }
    }

    /// The opposite byte order.
    pub fn swapped(self) -> Self {
        match self {
            Self::Little => Self::Big,
            Self::Big => Self::Little,
        }
    }

    /// Returns `true` if values in this order must be swapped to be native.
    pub fn is_swapped(self) -> bool {
        self != Self::native()
    }

    /// Decodes an `i16` stored in this order.
    pub fn read_i16(self, b: [u8; 2]) -> i16 {
        match self {
            Self::Little => i16::from_le_bytes(b),
            Self::Big => i16::from_be_bytes(b),
        }
    }

    /// Decodes an `i32` stored in this order.
    pub fn read_i32(self, b: [u8; 4]) -> i32 {
        match self {
            Self::Little => i32::from_le_bytes(b),
            Self::Big => i32::from_be_bytes(b),
        }
    }

    /// Decodes an `f32` stored in this order.
    pub fn read_f32(self, b: [u8; 4]) -> f32 {
        match self {
            Self::Little => f32::from_le_bytes(b),
            Self::Big => f32::from_be_bytes(b),
        }
    }

    /// Encodes an `i16` in this order.
    pub fn i16_bytes(self, v: i16) -> [u8; 2] {
        match self {
            Self::Little => v.to_le_bytes(),
            Self::Big => v.to_be_bytes(),
        }
    }

    /// Encodes an `i32` in this order.
    pub fn i32_bytes(self, v: i32) -> [u8; 4] {
        match self {
            Self::Little => v.to_le_bytes(),
            Self::Big => v.to_be_bytes(),
        }
    }

    /// Encodes an `f32` in this order.
    pub fn f32_bytes(self, v: f32) -> [u8; 4] {
        match self {
            Self::Little => v.to_le_bytes(),
            Self::Big => v.to_be_bytes(),
        }
    }
}

/// Header of an LPJmL grid-definition file.
///
/// Field order matches the on-disk layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHeader {
    /// Format version, 1 or 2.
    pub version: i32,
    /// Storage order of the data.
    pub order: i32,
    /// First year (unused for grid files).
    pub first_year: i32,
    /// Number of years (unused for grid files).
    pub n_years: i32,
    /// Index of the first cell.
    pub first_cell: i32,
    /// Number of cells that follow the header.
    pub n_cells: i32,
    /// Number of bands per cell (2 for grid files).
    pub n_bands: i32,
    /// Cell size in degrees.
    pub cell_size: f32,
    /// Scaling factor of the stored values.
    pub scalar: f32,
}

fn is_supported_version(version: i32) -> bool {
    version == 1 || version == 2
}

fn word(raw: &[u8; GRID_HEADER_SIZE], field: usize) -> [u8; 4] {
    let at = field * 4;
    [raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]
}

impl GridHeader {
    /// Decodes a raw header, detecting its byte order from the version field.
    ///
    /// The version must be 1 or 2 when read in native order; otherwise the
    /// header is decoded with swapped byte order and checked again. The
    /// detected [`ByteOrder`] is returned so the cell coordinates can be
    /// decoded the same way.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UndeterminedEndian`] if neither order yields a
    /// supported version.
    pub fn normalize(raw: &[u8; GRID_HEADER_SIZE]) -> Result<(Self, ByteOrder), GridError> {
        let native = ByteOrder::native();
        for order in [native, native.swapped()] {
            if is_supported_version(order.read_i32(word(raw, 0))) {
                return Ok((Self::decode(raw, order), order));
            }
        }
        Err(GridError::UndeterminedEndian {
            raw_version: u32::from_ne_bytes(word(raw, 0)),
        })
    }

    /// Decodes a raw header in a known byte order without validation.
    pub fn decode(raw: &[u8; GRID_HEADER_SIZE], order: ByteOrder) -> Self {
        let int = |field| order.read_i32(word(raw, field));
        Self {
            version: int(0),
            order: int(1),
            first_year: int(2),
            n_years: int(3),
            first_cell: int(4),
            n_cells: int(5),
            n_bands: int(6),
            cell_size: order.read_f32(word(raw, 7)),
            scalar: order.read_f32(word(raw, 8)),
        }
    }

    /// Encodes the header in the given byte order.
    pub fn encode(&self, order: ByteOrder) -> [u8; GRID_HEADER_SIZE] {
        let mut out = [0u8; GRID_HEADER_SIZE];
        let ints = [
            self.version,
            self.order,
            self.first_year,
            self.n_years,
            self.first_cell,
            self.n_cells,
            self.n_bands,
        ];
        for (i, v) in ints.into_iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&order.i32_bytes(v));
        }
        out[28..32].copy_from_slice(&order.f32_bytes(self.cell_size));
        out[32..36].copy_from_slice(&order.f32_bytes(self.scalar));
        out
    }

    /// Returns the number of cells as an index type.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidCellCount`] if the stored count is
    /// negative.
    pub fn cell_count(&self) -> Result<usize, GridError> {
        usize::try_from(self.n_cells).map_err(|_| GridError::InvalidCellCount {
            n_cells: self.n_cells,
        })
    }
}
