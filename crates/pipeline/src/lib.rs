//! # nc2clm-pipeline
//!
//! Converts a chronological sequence of daily NetCDF datasets into one
//! LPJmL CLM stream.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph TD
//!     A["grid file"] -->|"read_grid_file()"| B["GridDefinition"]
//!     C["NetCDF inputs"] -->|"SourceDataset::open()"| D["SourceDataset"]
//!     B --> E["CoordinateIndexMap::resolve()"]
//!     D --> E
//!     E --> F["per year: DayPlan"]
//!     F -->|"AnnualRecord::build()"| G["validate + transform + fold"]
//!     G -->|"ClmWriter::write_record()"| H["CLM stream"]
//!     H -->|"ClmWriter::finish()"| I["final header"]
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use nc2clm_pipeline::{ConvertConfig, run};
//!
//! let config = ConvertConfig::new(
//!     vec!["tas_1901_1910.nc".into(), "tas_1911_1920.nc".into()],
//!     "tas",
//!     1901,
//!     "grid.bin",
//!     "tas.clm",
//! )
//! .with_offset(-273.15)
//! .with_convert(10.0)
//! .with_scalar(0.1);
//!
//! let report = run(&config)?;
//! println!("{} years written", report.years_written);
//! # Ok::<(), nc2clm_pipeline::PipelineError>(())
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | Run configuration builder |
//! | `transform` | Offset and scale |
//! | `validate` | Fill/NaN detection, range checks, counters |
//! | `annual` | Annual record assembly |
//! | `run` | File loop and run report |
//! | `error` | Error types and exit codes |

mod annual;
mod config;
mod error;
mod run;
mod transform;
mod validate;

pub use annual::{AnnualRecord, YearInput};
pub use config::ConvertConfig;
pub use error::{
    EXIT_FILE_ERROR, EXIT_GRID_ERROR, EXIT_USAGE_ERROR, EXIT_VALUE_WARNINGS, PipelineError,
};
pub use run::{Converter, RunReport, RunStatus, Stage, run};
pub use transform::Transform;
pub use validate::{ErrorCounters, FILL_TOLERANCE, FieldRange, Validity, range_check, validate};
