//! Pure conversion functions: TOML run description -> pipeline config.

use anyhow::{Result, bail};
use nc2clm_grid::CoordinateScale;
use nc2clm_io::OutputPrecision;
use nc2clm_pipeline::ConvertConfig;

use crate::config::RunToml;

/// Parses a coordinate scale name into the corresponding enum variant.
pub fn parse_coordinate_scale(s: &str) -> Result<CoordinateScale> {
    match s.to_lowercase().as_str() {
        "cellsize" | "cell_size" => Ok(CoordinateScale::CellSize),
        "scalar" => Ok(CoordinateScale::Scalar),
        other => bail!("unknown coordinate scale: {other:?}"),
    }
}

/// Builds a [`ConvertConfig`] from a run description.
pub fn build_convert_config(run: &RunToml) -> Result<ConvertConfig> {
    let precision = if run.float {
        OutputPrecision::Float
    } else {
        OutputPrecision::Short
    };
    let config = ConvertConfig::new(
        run.inputs.clone(),
        &run.variable,
        run.first_year,
        &run.grid,
        &run.output,
    )
    .with_offset(run.offset)
    .with_convert(run.convert)
    .with_scalar(run.scalar)
    .with_precision(precision)
    .with_coordinate_scale(parse_coordinate_scale(&run.coordinate_scale)?);
    config.validate()?;
    Ok(config)
}
