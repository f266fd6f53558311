use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// One conversion run, as read from TOML or assembled from positionals.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunToml {
    /// Input datasets in chronological order.
    pub inputs: Vec<PathBuf>,
    /// Name of the data variable.
    pub variable: String,
    /// Calendar year of the first day of the first input.
    pub first_year: i32,
    /// Grid-definition file.
    pub grid: PathBuf,
    #[serde(default)]
    pub offset: f32,
    #[serde(default = "default_one")]
    pub convert: f32,
    #[serde(default = "default_one")]
    pub scalar: f32,
    /// CLM output file.
    pub output: PathBuf,
    #[serde(default)]
    pub float: bool,
    #[serde(default = "default_coordinate_scale")]
    pub coordinate_scale: String,
}

fn default_one() -> f32 {
    1.0
}

pub fn default_coordinate_scale() -> String {
    "cellsize".to_string()
}

impl RunToml {
    /// Reads and parses a TOML run description.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}
