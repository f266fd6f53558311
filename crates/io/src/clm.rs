//! LPJmL CLM output stream: header layout and the two-phase writer.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use nc2clm_grid::ByteOrder;
use tracing::debug;

use crate::error::IoError;

/// Magic bytes at the start of every CLM file.
pub const CLM_MAGIC: &[u8; 7] = b"LPJCLIM";

/// Size in bytes of the header fields following the magic.
pub const CLM_HEADER_SIZE: usize = 36;

/// LPJmL datatype tag for 16-bit integer data.
pub const LPJ_SHORT: i32 = 1;

/// LPJmL datatype tag for 32-bit float data.
pub const LPJ_FLOAT: i32 = 3;

/// Byte order of everything this crate writes.
const OUTPUT_ORDER: ByteOrder = ByteOrder::Little;

/// Number of daily bands per cell and year.
const BANDS: i32 = 365;

/// Value representation of a CLM file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputPrecision {
    /// Values rounded to the nearest integer and stored as `i16` (CLM
    /// version 2).
    #[default]
    Short,
    /// Values stored as `f32` (CLM version 3).
    Float,
}

impl OutputPrecision {
    /// CLM header version for this precision.
    pub fn version(self) -> i32 {
        match self {
            Self::Short => 2,
            Self::Float => 3,
        }
    }

    /// LPJmL datatype tag.
    pub fn datatype(self) -> i32 {
        match self {
            Self::Short => LPJ_SHORT,
            Self::Float => LPJ_FLOAT,
        }
    }

    /// Bytes per stored value.
    pub fn value_size(self) -> usize {
        match self {
            Self::Short => 2,
            Self::Float => 4,
        }
    }

    /// Total bytes before the first record: magic, header and, for floats,
    /// the `(cell_size, datatype)` extension.
    pub fn header_len(self) -> usize {
        let extension = match self {
            Self::Short => 0,
            Self::Float => 8,
        };
        CLM_MAGIC.len() + CLM_HEADER_SIZE + extension
    }
}

/// Header of a CLM file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClmHeader {
    /// 2 for `i16` data, 3 for `f32` data.
    pub version: i32,
    /// Storage order, always 1 (cell by cell).
    pub order: i32,
    /// First year of the whole file.
    pub first_year: i32,
    /// Number of years; 0 until the writer is finished.
    pub n_years: i32,
    /// Index of the first cell.
    pub first_cell: i32,
    /// Number of cells per year.
    pub n_cells: i32,
    /// Bands per cell and year, always 365.
    pub n_bands: i32,
    /// Cell size in degrees.
    pub cell_size: f32,
    /// Factor applied by LPJmL when reading the values.
    pub scalar: f32,
}

impl ClmHeader {
    /// Creates a provisional header (`n_years = 0`) for daily data.
    pub fn new(
        precision: OutputPrecision,
        first_year: i32,
        first_cell: i32,
        n_cells: i32,
        cell_size: f32,
        scalar: f32,
    ) -> Self {
        Self {
            version: precision.version(),
            order: 1,
            first_year,
            n_years: 0,
            first_cell,
            n_cells,
            n_bands: BANDS,
            cell_size,
            scalar,
        }
    }

    /// Encodes the header fields (without magic) in the given order.
    pub fn encode(&self, order: ByteOrder) -> [u8; CLM_HEADER_SIZE] {
        let mut out = [0u8; CLM_HEADER_SIZE];
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

    /// Decodes header fields, detecting the byte order from the version
    /// field (1, 2 or 3).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidHeader`] if no byte order yields a known
    /// version.
    pub fn decode(raw: &[u8; CLM_HEADER_SIZE]) -> Result<(Self, ByteOrder), IoError> {
        let word = |field: usize| {
            let at = field * 4;
            [raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]
        };
        let native = ByteOrder::native();
        let order = [native, native.swapped()]
            .into_iter()
            .find(|o| (1..=3).contains(&o.read_i32(word(0))))
            .ok_or_else(|| IoError::InvalidHeader {
                reason: "cannot determine byte order from version field".to_string(),
            })?;
        let int = |field| order.read_i32(word(field));
        let header = Self {
            version: int(0),
            order: int(1),
            first_year: int(2),
            n_years: int(3),
            first_cell: int(4),
            n_cells: int(5),
            n_bands: int(6),
            cell_size: order.read_f32(word(7)),
            scalar: order.read_f32(word(8)),
        };
        Ok((header, order))
    }

    /// Number of values in one annual record: `n_cells * n_bands`.
    pub fn record_len(&self) -> usize {
        usize::try_from(self.n_cells).unwrap_or(0) * usize::try_from(self.n_bands).unwrap_or(0)
    }
}

/// A decoded CLM header together with its storage details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClmInfo {
    /// Header fields.
    pub header: ClmHeader,
    /// Byte order the header was stored in.
    pub byte_order: ByteOrder,
    /// Datatype tag; [`LPJ_SHORT`] unless a version 3 extension says
    /// otherwise.
    pub datatype: i32,
}

/// Reads the magic and header of a CLM stream.
///
/// # Errors
///
/// Returns [`IoError::InvalidHeader`] for a wrong magic, an undetectable
/// byte order or a stream that ends inside the header.
pub fn read_clm_header<R: Read>(mut reader: R) -> Result<ClmInfo, IoError> {
    let truncated = |e: std::io::Error| IoError::InvalidHeader {
        reason: format!("stream ends inside header: {e}"),
    };

    let mut magic = [0u8; 7];
    reader.read_exact(&mut magic).map_err(truncated)?;
    if &magic != CLM_MAGIC {
        return Err(IoError::InvalidHeader {
            reason: format!("unexpected magic {:?}", String::from_utf8_lossy(&magic)),
        });
    }

    let mut raw = [0u8; CLM_HEADER_SIZE];
    reader.read_exact(&mut raw).map_err(truncated)?;
    let (header, byte_order) = ClmHeader::decode(&raw)?;

    let mut datatype = LPJ_SHORT;
    if header.version == 3 {
        let mut ext = [0u8; 8];
        reader.read_exact(&mut ext).map_err(truncated)?;
        datatype = byte_order.read_i32([ext[4], ext[5], ext[6], ext[7]]);
    }

    Ok(ClmInfo {
        header,
        byte_order,
        datatype,
    })
}

/// Writes a CLM stream: provisional header, annual records, final header.
///
/// The year count is only known after every input has been read, so the
/// header is written with `n_years = 0` and rewritten in place by
/// [`ClmWriter::finish`]. The sink therefore has to be seekable.
pub struct ClmWriter<W: Write + Seek> {
    sink: W,
    header: ClmHeader,
    precision: OutputPrecision,
    records: usize,
    scratch: Vec<u8>,
}

impl ClmWriter<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the provisional header.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Create`] if the file cannot be created, or
    /// [`IoError::Write`] if the header cannot be written.
    pub fn create_file(
        path: &Path,
        header: ClmHeader,
        precision: OutputPrecision,
    ) -> Result<Self, IoError> {
        let file = File::create(path).map_err(|e| IoError::Create {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::create(BufWriter::new(file), header, precision)
    }
}

impl<W: Write + Seek> ClmWriter<W> {
    /// Writes the magic, the header with `n_years` forced to 0 and, for
    /// float output, the `(cell_size, datatype)` extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Write`] if the sink rejects the header.
    pub fn create(
        mut sink: W,
        mut header: ClmHeader,
        precision: OutputPrecision,
    ) -> Result<Self, IoError> {
        header.version = precision.version();
        header.n_years = 0;

        sink.write_all(CLM_MAGIC)?;
        sink.write_all(&header.encode(OUTPUT_ORDER))?;
        if precision == OutputPrecision::Float {
            // Square cells: one size for both axes.
            sink.write_all(&OUTPUT_ORDER.f32_bytes(header.cell_size))?;
            sink.write_all(&OUTPUT_ORDER.i32_bytes(precision.datatype()))?;
        }
        debug!(
            version = header.version,
            n_cells = header.n_cells,
            first_year = header.first_year,
            "wrote provisional CLM header"
        );

        Ok(Self {
            sink,
            header,
            precision,
            records: 0,
            scratch: Vec::new(),
        })
    }

    /// Header as written so far.
    pub fn header(&self) -> &ClmHeader {
        &self.header
    }

    /// Number of annual records written.
    pub fn records_written(&self) -> usize {
        self.records
    }

    /// Encodes one annual record of `n_cells * 365` values.
    ///
    /// Short output rounds each value to the nearest integer (ties away
    /// from zero) and saturates at the `i16` bounds; float output stores
    /// the values unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::RecordLength`] for a record of the wrong size, or
    /// [`IoError::Write`] if the sink fails.
    pub fn write_record(&mut self, values: &[f32]) -> Result<(), IoError> {
        let expected = self.header.record_len();
        if values.len() != expected {
            return Err(IoError::RecordLength {
                expected,
                got: values.len(),
            });
        }

        self.scratch.clear();
        self.scratch.reserve(values.len() * self.precision.value_size());
        match self.precision {
            OutputPrecision::Short => {
                for &v in values {
                    let rounded = v.round() as i16;
                    self.scratch.extend_from_slice(&OUTPUT_ORDER.i16_bytes(rounded));
                }
            }
            OutputPrecision::Float => {
                for &v in values {
                    self.scratch.extend_from_slice(&OUTPUT_ORDER.f32_bytes(v));
                }
            }
        }
        self.sink.write_all(&self.scratch)?;
        self.records += 1;
        Ok(())
    }

    /// Rewrites the header with the final year count and returns the sink.
    ///
    /// Seeks to the byte after the magic, writes the complete header again,
    /// seeks back to the end of the stream and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Write`] if seeking, writing or flushing fails.
    pub fn finish(mut self, n_years: i32) -> Result<W, IoError> {
        self.header.n_years = n_years;
        self.sink.seek(SeekFrom::Start(CLM_MAGIC.len() as u64))?;
        self.sink.write_all(&self.header.encode(OUTPUT_ORDER))?;
        self.sink.seek(SeekFrom::End(0))?;
        self.sink.flush()?;
        debug!(n_years, records = self.records, "finalised CLM header");
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn header(n_cells: i32) -> ClmHeader {
        ClmHeader::new(OutputPrecision::Short, 1901, 0, n_cells, 0.5, 0.1)
    }

    #[test]
    fn header_lengths() {
        assert_eq!(OutputPrecision::Short.header_len(), 43);
        assert_eq!(OutputPrecision::Float.header_len(), 51);
    }

    #[test]
    fn provisional_header_has_zero_years() {
        let mut h = header(1);
        h.n_years = 42;
        let writer = ClmWriter::create(Cursor::new(Vec::new()), h, OutputPrecision::Short).unwrap();
        assert_eq!(writer.header().n_years, 0);
        let bytes = writer.sink.into_inner();
        assert_eq!(&bytes[..7], CLM_MAGIC);
        assert_eq!(i32::from_le_bytes(bytes[19..23].try_into().unwrap()), 0);
    }

    #[test]
    fn short_values_round_half_away_from_zero() {
        let mut values = vec![0.0f32; 365];
        values[0] = 1.5;
        values[1] = -1.5;
        values[2] = 2.49;
        values[3] = 40000.0;
        values[4] = -40000.0;
        let mut writer =
            ClmWriter::create(Cursor::new(Vec::new()), header(1), OutputPrecision::Short).unwrap();
        writer.write_record(&values).unwrap();
        let bytes = writer.finish(1).unwrap().into_inner();

        let data = &bytes[OutputPrecision::Short.header_len()..];
        let decoded: Vec<i16> = data
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(decoded.len(), 365);
        assert_eq!(&decoded[..5], &[2, -2, 2, i16::MAX, i16::MIN]);
    }

    #[test]
    fn float_output_carries_extension() {
        let mut writer =
            ClmWriter::create(Cursor::new(Vec::new()), header(1), OutputPrecision::Float).unwrap();
        writer.write_record(&vec![0.25; 365]).unwrap();
        let bytes = writer.finish(1).unwrap().into_inner();

        assert_eq!(bytes.len(), 51 + 365 * 4);
        let info = read_clm_header(bytes.as_slice()).unwrap();
        assert_eq!(info.header.version, 3);
        assert_eq!(info.datatype, LPJ_FLOAT);
        assert_eq!(f32::from_le_bytes(bytes[43..47].try_into().unwrap()), 0.5);
        assert_eq!(f32::from_le_bytes(bytes[51..55].try_into().unwrap()), 0.25);
    }

    #[test]
    fn finish_patches_year_count_and_keeps_data() {
        let mut writer =
            ClmWriter::create(Cursor::new(Vec::new()), header(2), OutputPrecision::Short).unwrap();
        for _ in 0..3 {
            writer.write_record(&vec![7.0; 730]).unwrap();
        }
        assert_eq!(writer.records_written(), 3);
        let bytes = writer.finish(3).unwrap().into_inner();

        assert_eq!(bytes.len(), 43 + 3 * 730 * 2);
        let info = read_clm_header(bytes.as_slice()).unwrap();
        assert_eq!(info.header.n_years, 3);
        assert_eq!(info.header.n_cells, 2);
        assert_eq!(info.header.n_bands, 365);
        assert_eq!(info.byte_order, ByteOrder::Little);
        assert_eq!(info.datatype, LPJ_SHORT);
    }

    #[test]
    fn wrong_record_length_is_rejected() {
        let mut writer =
            ClmWriter::create(Cursor::new(Vec::new()), header(2), OutputPrecision::Short).unwrap();
        let err = writer.write_record(&[0.0; 365]).unwrap_err();
        assert!(matches!(
            err,
            IoError::RecordLength {
                expected: 730,
                got: 365
            }
        ));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let err = read_clm_header(&b"LPJGRID"[..]).unwrap_err();
        assert!(matches!(err, IoError::InvalidHeader { .. }));
    }

    #[test]
    fn big_endian_header_is_detected() {
        let mut bytes = CLM_MAGIC.to_vec();
        bytes.extend_from_slice(&header(5).encode(ByteOrder::Big));
        let info = read_clm_header(bytes.as_slice()).unwrap();
        assert_eq!(info.byte_order, ByteOrder::Big);
        assert_eq!(info.header.n_cells, 5);
    }
}
