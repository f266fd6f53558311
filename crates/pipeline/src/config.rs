//! Run configuration for a conversion.

use std::path::{Path, PathBuf};

use nc2clm_grid::CoordinateScale;
use nc2clm_io::OutputPrecision;

use crate::error::PipelineError;
use crate::transform::Transform;

/// Everything a conversion run needs.
///
/// Required inputs go through [`ConvertConfig::new`]; the remaining
/// parameters have defaults and are set with the builder methods.
///
/// # Example
///
/// ```
/// use nc2clm_pipeline::ConvertConfig;
///
/// let config = ConvertConfig::new(vec!["tas_1901.nc".into()], "tas", 1901, "grid.bin", "tas.clm")
///     .with_offset(-273.15)
///     .with_convert(10.0)
///     .with_scalar(0.1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct ConvertConfig {
    inputs: Vec<PathBuf>,
    variable: String,
    first_year: i32,
    grid: PathBuf,
    output: PathBuf,
    offset: f32,
    convert: f32,
    scalar: f32,
    precision: OutputPrecision,
    coordinate_scale: CoordinateScale,
}

impl ConvertConfig {
    /// Creates a configuration with defaults.
    ///
    /// Defaults: `offset = 0.0`, `convert = 1.0`, `scalar = 1.0`,
    /// `precision = Short`, `coordinate_scale = CellSize`.
    pub fn new(
        inputs: Vec<PathBuf>,
        variable: impl Into<String>,
        first_year: i32,
        grid: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            inputs,
            variable: variable.into(),
            first_year,
            grid: grid.into(),
            output: output.into(),
            offset: 0.0,
            convert: 1.0,
            scalar: 1.0,
            precision: OutputPrecision::Short,
            coordinate_scale: CoordinateScale::CellSize,
        }
    }

    // --- Builder methods ---

    /// Sets the additive offset applied before `convert`.
    pub fn with_offset(mut self, v: f32) -> Self {
        self.offset = v;
        self
    }

    /// Sets the multiplicative conversion factor.
    pub fn with_convert(mut self, v: f32) -> Self {
        self.convert = v;
        self
    }

    /// Sets the display scalar stored in the output header.
    pub fn with_scalar(mut self, v: f32) -> Self {
        self.scalar = v;
        self
    }

    /// Sets the output precision.
    pub fn with_precision(mut self, p: OutputPrecision) -> Self {
        self.precision = p;
        self
    }

    /// Sets which grid header field converts raw cell coordinates to
    /// degrees.
    pub fn with_coordinate_scale(mut self, s: CoordinateScale) -> Self {
        self.coordinate_scale = s;
        self
    }

    // --- Accessors ---

    /// Input datasets in chronological order.
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Name of the data variable.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Calendar year of the first day of the first input.
    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    /// Path of the grid-definition file.
    pub fn grid(&self) -> &Path {
        &self.grid
    }

    /// Path of the CLM output file.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Additive offset.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Multiplicative conversion factor.
    pub fn convert(&self) -> f32 {
        self.convert
    }

    /// Display scalar.
    pub fn scalar(&self) -> f32 {
        self.scalar
    }

    /// Output precision.
    pub fn precision(&self) -> OutputPrecision {
        self.precision
    }

    /// Coordinate scale used to resolve grid cells.
    pub fn coordinate_scale(&self) -> CoordinateScale {
        self.coordinate_scale
    }

    /// Value transform built from `offset` and `convert`.
    pub fn transform(&self) -> Transform {
        Transform::new(self.offset, self.convert)
    }

    /// Validates this configuration.
    ///
    /// Checks that at least one input is given, the variable name is not
    /// empty and `offset`, `convert` and `scalar` are finite.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.inputs.is_empty() {
            return Err(PipelineError::InvalidConfig {
                reason: "at least one input file is required".to_string(),
            });
        }

        if self.variable.trim().is_empty() {
            return Err(PipelineError::InvalidConfig {
                reason: "variable name must not be empty".to_string(),
            });
        }

        for (name, value) in [
            ("offset", self.offset),
            ("convert", self.convert),
            ("scalar", self.scalar),
        ] {
            if !value.is_finite() {
                return Err(PipelineError::InvalidConfig {
                    reason: format!("{name} must be finite, got {value}"),
                });
            }
        }

        Ok(())
    }
}
