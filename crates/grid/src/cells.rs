//! Simulation cell coordinates.

use crate::header::{ByteOrder, GridHeader};

/// One simulation cell as stored in the grid file: scaled integer
/// longitude and latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// Stored longitude; physical longitude is `raw_lon * scale`.
    pub raw_lon: i16,
    /// Stored latitude; physical latitude is `raw_lat * scale`.
    pub raw_lat: i16,
}

impl GridCell {
    /// Creates a cell from its stored coordinates.
    pub fn new(raw_lon: i16, raw_lat: i16) -> Self {
        Self { raw_lon, raw_lat }
    }

    /// Physical longitude for the given coordinate scale.
    pub fn lon(self, scale: f64) -> f64 {
        f64::from(self.raw_lon) * scale
    }

    /// Physical latitude for the given coordinate scale.
    pub fn lat(self, scale: f64) -> f64 {
        f64::from(self.raw_lat) * scale
    }

    /// Decodes interleaved `(lon, lat)` pairs of `i16`.
    pub(crate) fn decode_all(bytes: &[u8], order: ByteOrder) -> Vec<Self> {
        bytes
            .chunks_exact(4)
            .map(|c| Self {
                raw_lon: order.read_i16([c[0], c[1]]),
                raw_lat: order.read_i16([c[2], c[3]]),
            })
            .collect()
    }

    pub(crate) fn encode_into(self, order: ByteOrder, out: &mut Vec<u8>) {
        out.extend_from_slice(&order.i16_bytes(self.raw_lon));
        out.extend_from_slice(&order.i16_bytes(self.raw_lat));
    }
}

/// Which grid header field converts stored cell coordinates to degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinateScale {
    /// Multiply by the header's `cell_size`.
    #[default]
    CellSize,
    /// Multiply by the header's `scalar` (LPJmL grid convention, e.g. 0.01).
    Scalar,
}

impl CoordinateScale {
    /// Returns the multiplication factor for the given header.
    pub fn factor(self, header: &GridHeader) -> f64 {
        match self {
            Self::CellSize => f64::from(header.cell_size),
            Self::Scalar => f64::from(header.scalar),
        }
    }
}
