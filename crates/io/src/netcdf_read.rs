//! Low-level NetCDF extraction helpers.

use std::path::Path;

use netcdf::AttributeValue;

use crate::error::IoError;

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Length of a named dimension.
pub(crate) fn dimension_len(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<usize, IoError> {
    file.dimension(name)
        .map(|d| d.len())
        .ok_or_else(|| IoError::MissingDimension {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
}

/// Read a 1-D coordinate variable as `f64`.
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    let var = file.variable(name).ok_or_else(|| IoError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    })?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Read a numeric attribute of `var` as `f32`.
///
/// Returns `None` if the attribute is absent or not a single number.
pub(crate) fn numeric_attribute(var: &netcdf::Variable, name: &str) -> Option<f32> {
    if !var.attributes().any(|attr| attr.name() == name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Float(v) => Some(v),
        AttributeValue::Double(v) => Some(v as f32),
        AttributeValue::Short(v) => Some(f32::from(v)),
        AttributeValue::Int(v) => Some(v as f32),
        AttributeValue::Schar(v) => Some(f32::from(v)),
        AttributeValue::Uchar(v) => Some(f32::from(v)),
        AttributeValue::Ushort(v) => Some(f32::from(v)),
        AttributeValue::Uint(v) => Some(v as f32),
        _ => None,
    }
}

/// Names of the dimensions of `var`, in order.
pub(crate) fn dimension_names(var: &netcdf::Variable) -> Vec<String> {
    var.dimensions().iter().map(|d| d.name()).collect()
}
