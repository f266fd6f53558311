//! # nc2clm-io
//!
//! Read daily climate variables from NetCDF files and write LPJmL CLM
//! streams. Bridges the external file formats into the `&[f32]` slices the
//! conversion pipeline works on.

mod clm;
mod dataset;
mod error;
mod netcdf_read;

pub use clm::{
    CLM_HEADER_SIZE, CLM_MAGIC, ClmHeader, ClmInfo, ClmWriter, LPJ_FLOAT, LPJ_SHORT,
    OutputPrecision, read_clm_header,
};
pub use dataset::{FillAttribute, SourceDataset};
pub use error::IoError;
