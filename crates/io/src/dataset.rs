//! One NetCDF input file holding a daily `(time, lat, lon)` variable.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::IoError;
use crate::netcdf_read;

/// Days per year used to count the years in a file.
const DAYS_PER_YEAR: usize = 365;

/// Attribute the fill value was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillAttribute {
    /// `_FillValue`.
    FillValue,
    /// `missing_value`, used when `_FillValue` is absent.
    MissingValue,
}

impl FillAttribute {
    /// The attribute name as stored in the file.
    pub fn name(self) -> &'static str {
        match self {
            Self::FillValue => "_FillValue",
            Self::MissingValue => "missing_value",
        }
    }
}

impl fmt::Display for FillAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An open NetCDF source dataset.
///
/// Holds the file handle, the coordinate axes and the fill value of the
/// data variable. The file is closed when the dataset is dropped.
pub struct SourceDataset {
    path: PathBuf,
    file: netcdf::File,
    variable: String,
    fill_value: f32,
    fill_attribute: FillAttribute,
    time_len: usize,
    lons: Vec<f64>,
    lats: Vec<f64>,
}

impl fmt::Debug for SourceDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDataset")
            .field("path", &self.path)
            .field("variable", &self.variable)
            .field("fill_value", &self.fill_value)
            .field("time_len", &self.time_len)
            .field("lat_len", &self.lats.len())
            .field("lon_len", &self.lons.len())
            .finish()
    }
}

impl SourceDataset {
    /// Opens `path` and checks that it holds `variable` over
    /// `(time, lat, lon)` with a fill value and coordinate axes.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FileNotFound`] or [`IoError::Netcdf`] if the file
    /// cannot be opened, [`IoError::MissingVariable`] if the data or a
    /// coordinate variable is absent, [`IoError::MissingFillValue`] if
    /// neither fill attribute is present, [`IoError::MissingDimension`] if
    /// `time`, `lat` or `lon` is absent, and
    /// [`IoError::UnexpectedDimensions`] if the variable is laid out
    /// differently.
    pub fn open(path: &Path, variable: &str) -> Result<Self, IoError> {
        let file = netcdf_read::open_file(path)?;

        let (fill_value, fill_attribute, dims) = {
            let var = file
                .variable(variable)
                .ok_or_else(|| IoError::MissingVariable {
                    name: variable.to_string(),
                    path: path.to_path_buf(),
                })?;

            let (fill_value, fill_attribute) = match netcdf_read::numeric_attribute(
                &var,
                FillAttribute::FillValue.name(),
            ) {
                Some(v) => (v, FillAttribute::FillValue),
                None => {
                    info!(
                        path = %path.display(),
                        "no _FillValue attribute, checking for missing_value"
                    );
                    let v = netcdf_read::numeric_attribute(
                        &var,
                        FillAttribute::MissingValue.name(),
                    )
                    .ok_or_else(|| IoError::MissingFillValue {
                        name: variable.to_string(),
                        path: path.to_path_buf(),
                    })?;
                    info!("using missing_value attribute instead of _FillValue");
                    (v, FillAttribute::MissingValue)
                }
            };
            (fill_value, fill_attribute, netcdf_read::dimension_names(&var))
        };

        let time_len = netcdf_read::dimension_len(&file, "time", path)?;
        let lat_len = netcdf_read::dimension_len(&file, "lat", path)?;
        let lon_len = netcdf_read::dimension_len(&file, "lon", path)?;

        if dims != ["time", "lat", "lon"] {
            return Err(IoError::UnexpectedDimensions {
                name: variable.to_string(),
                found: dims,
            });
        }

        let lats = netcdf_read::read_1d_f64(&file, "lat", path)?;
        let lons = netcdf_read::read_1d_f64(&file, "lon", path)?;
        debug!(
            path = %path.display(),
            variable,
            time_len,
            lat_len,
            lon_len,
            fill_value,
            %fill_attribute,
            "opened source dataset"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            variable: variable.to_string(),
            fill_value,
            fill_attribute,
            time_len,
            lons,
            lats,
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the data variable.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Fill value of the data variable.
    pub fn fill_value(&self) -> f32 {
        self.fill_value
    }

    /// Attribute the fill value was read from.
    pub fn fill_attribute(&self) -> FillAttribute {
        self.fill_attribute
    }

    /// Length of the time axis in days.
    pub fn time_len(&self) -> usize {
        self.time_len
    }

    /// Number of complete 365-day years: `floor(time_len / 365)`.
    pub fn n_years(&self) -> usize {
        self.time_len / DAYS_PER_YEAR
    }

    /// Longitude axis values.
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Latitude axis values.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Number of values in one `lat x lon` time slice.
    pub fn slice_len(&self) -> usize {
        self.lats.len() * self.lons.len()
    }

    /// Reads `count` days starting at `start` into `buf`, laid out as
    /// `[day][lat][lon]`.
    ///
    /// `buf` is resized to `count * slice_len()` and reused across calls.
    /// Days past the end of the time axis are left at zero; the number of
    /// days actually read is returned.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Netcdf`] if the hyperslab cannot be read.
    pub fn read_days(
        &self,
        start: usize,
        count: usize,
        buf: &mut Vec<f32>,
    ) -> Result<usize, IoError> {
        let slice = self.slice_len();
        buf.clear();
        buf.resize(count * slice, 0.0);

        let available = self.time_len.saturating_sub(start).min(count);
        if available < count {
            warn!(
                path = %self.path.display(),
                start,
                requested = count,
                available,
                "time axis exhausted, missing days are left at zero"
            );
        }
        if available == 0 {
            return Ok(0);
        }

        let var = self
            .file
            .variable(&self.variable)
            .ok_or_else(|| IoError::MissingVariable {
                name: self.variable.clone(),
                path: self.path.clone(),
            })?;
        var.get_values_into(&mut buf[..available * slice], (start..start + available, .., ..))?;
        Ok(available)
    }
}
