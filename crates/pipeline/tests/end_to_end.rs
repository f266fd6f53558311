//! End-to-end conversions of NetCDF fixtures into CLM files.

use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use nc2clm_grid::{ByteOrder, GridCell, GridDefinition, GridError, GridHeader};
use nc2clm_io::{OutputPrecision, read_clm_header};
use nc2clm_pipeline::{ConvertConfig, PipelineError, RunStatus, run};
use tempfile::tempdir;

const FILL: f32 = -9999.0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Writes a grid file with the given raw cell coordinates.
fn write_grid(dir: &Path, cells: &[(i16, i16)], cell_size: f32, order: ByteOrder) -> PathBuf {
    let header = GridHeader {
        version: 2,
        order: 1,
        first_year: 1901,
        n_years: 1,
        first_cell: 0,
        n_cells: 0,
        n_bands: 2,
        cell_size,
        scalar: 0.01,
    };
    let cells = cells.iter().map(|&(lon, lat)| GridCell::new(lon, lat)).collect();
    let path = dir.join("grid.bin");
    std::fs::write(&path, GridDefinition::new(header, order, cells).to_bytes()).unwrap();
    path
}

/// Programmatic `(time, lat, lon)` dataset on the 2 x 2 axes
/// lon = [10, 11], lat = [50, 51].
struct FixtureBuilder {
    name: String,
    variable: String,
    nt: usize,
    lons: Vec<f64>,
    lats: Vec<f64>,
    data: Vec<f32>,
}

impl FixtureBuilder {
    /// Day `t` at (lat index j, lon index i) holds `t / 10 + 100 j + 10 i`.
    fn new(name: &str, variable: &str, nt: usize) -> Self {
        let mut data = Vec::with_capacity(nt * 4);
        for t in 0..nt {
            for j in 0..2 {
                for i in 0..2 {
                    data.push(t as f32 / 10.0 + 100.0 * j as f32 + 10.0 * i as f32);
                }
            }
        }
        Self {
            name: name.to_string(),
            variable: variable.to_string(),
            nt,
            lons: vec![10.0, 11.0],
            lats: vec![50.0, 51.0],
            data,
        }
    }

    /// Replaces the values at `(lat j, lon i)` across all days.
    fn with_series(mut self, j: usize, i: usize, series: &[f32]) -> Self {
        assert_eq!(series.len(), self.nt);
        for (t, &v) in series.iter().enumerate() {
            self.data[t * 4 + j * 2 + i] = v;
        }
        self
    }

    fn with_value(mut self, t: usize, j: usize, i: usize, v: f32) -> Self {
        self.data[t * 4 + j * 2 + i] = v;
        self
    }

    /// Series of `(lat j, lon i)`.
    fn series(&self, j: usize, i: usize) -> Vec<f32> {
        (0..self.nt).map(|t| self.data[t * 4 + j * 2 + i]).collect()
    }

    fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join(&self.name);
        let mut file = netcdf::create(&path).expect("failed to create NetCDF file");
        file.add_dimension("time", self.nt).expect("add dim time");
        file.add_dimension("lat", 2).expect("add dim lat");
        file.add_dimension("lon", 2).expect("add dim lon");
        {
            let mut var = file
                .add_variable::<f64>("lon", &["lon"])
                .expect("add var lon");
            var.put_values(&self.lons, ..).expect("put lon values");
        }
        {
            let mut var = file
                .add_variable::<f64>("lat", &["lat"])
                .expect("add var lat");
            var.put_values(&self.lats, ..).expect("put lat values");
        }
        let mut var = file
            .add_variable::<f32>(&self.variable, &["time", "lat", "lon"])
            .expect("add data var");
        var.put_attribute("_FillValue", FILL).expect("add _FillValue");
        var.put_values(&self.data, ..).expect("put data values");
        path
    }
}

/// Decodes every value of a CLM file as `f32`.
fn read_values(path: &Path) -> (nc2clm_io::ClmInfo, Vec<f32>) {
    let bytes = std::fs::read(path).unwrap();
    let info = read_clm_header(bytes.as_slice()).unwrap();
    let values = if info.header.version == 3 {
        bytes[OutputPrecision::Float.header_len()..]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    } else {
        bytes[OutputPrecision::Short.header_len()..]
            .chunks_exact(2)
            .map(|c| f32::from(i16::from_le_bytes([c[0], c[1]])))
            .collect()
    };
    (info, values)
}

/// Bands of `cell` in year `year_index` of a decoded file.
fn bands(values: &[f32], n_cells: usize, year_index: usize, cell: usize) -> &[f32] {
    let start = (year_index * n_cells + cell) * 365;
    &values[start..start + 365]
}

const TWO_CELLS: [(i16, i16); 2] = [(10, 50), (11, 51)];

// ---------------------------------------------------------------------------
// Calendar scenarios
// ---------------------------------------------------------------------------

#[test]
fn leap_year_folds_day_59_for_other_variables() {
    let dir = tempdir().unwrap();
    let grid = write_grid(dir.path(), &TWO_CELLS, 1.0, ByteOrder::native());

    let leap = FixtureBuilder::new("leap.nc", "tas", 366);
    let leap_path = leap.write(dir.path());

    // Same data without the leap day, as a non-leap year.
    let mut plain = FixtureBuilder::new("plain.nc", "tas", 365);
    for (j, i) in [(0, 0), (1, 1)] {
        let mut s = leap.series(j, i);
        s.remove(59);
        plain = plain.with_series(j, i, &s);
    }
    let plain_path = plain.write(dir.path());

    let (offset, convert) = (1.0, 2.0);
    let leap_out = dir.path().join("leap.clm");
    let plain_out = dir.path().join("plain.clm");
    for (input, year, out) in [(&leap_path, 2000, &leap_out), (&plain_path, 2001, &plain_out)] {
        let config = ConvertConfig::new(vec![input.clone()], "tas", year, &grid, out)
            .with_offset(offset)
            .with_convert(convert)
            .with_precision(OutputPrecision::Float);
        let report = run(&config).unwrap();
        assert!(report.is_finished());
        assert_eq!(report.exit_code(), 0);
    }

    let (_, leap_vals) = read_values(&leap_out);
    let (_, plain_vals) = read_values(&plain_out);
    assert_eq!(leap_vals.len(), 2 * 365);

    for (cell, (j, i)) in [(0, (0, 0)), (1, (1, 1))] {
        let day59 = leap.series(j, i)[59];
        let share = (day59 / 28.0 + offset) * convert;
        let l = bands(&leap_vals, 2, 0, cell);
        let p = bands(&plain_vals, 2, 0, cell);
        for band in 0..365 {
            let expected = if (31..59).contains(&band) { p[band] + share } else { p[band] };
            assert_abs_diff_eq!(l[band], expected, epsilon = 1e-3);
        }
    }
}

#[test]
fn leap_year_keeps_day_59_for_precipitation() {
    let dir = tempdir().unwrap();
    let grid = write_grid(dir.path(), &TWO_CELLS, 1.0, ByteOrder::native());
    let fx = FixtureBuilder::new("pr.nc", "pr", 366);
    let input = fx.write(dir.path());
    let out = dir.path().join("pr.clm");

    let config = ConvertConfig::new(vec![input], "pr", 2000, &grid, &out)
        .with_convert(3.0)
        .with_precision(OutputPrecision::Float);
    run(&config).unwrap();

    let (_, values) = read_values(&out);
    let series = fx.series(0, 0);
    let b = bands(&values, 2, 0, 0);
    assert_abs_diff_eq!(b[59], series[59] * 3.0, epsilon = 1e-4);
    for band in 31..59 {
        assert_abs_diff_eq!(b[band], series[band] * 3.0, epsilon = 1e-4);
    }
    // The last source day has no band.
    assert_abs_diff_eq!(b[364], series[364] * 3.0, epsilon = 1e-4);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn fill_value_counts_once_without_range_error() {
    let dir = tempdir().unwrap();
    let grid = write_grid(dir.path(), &TWO_CELLS, 1.0, ByteOrder::native());
    let input = FixtureBuilder::new("tas.nc", "tas", 365)
        .with_value(100, 0, 0, FILL)
        .write(dir.path());
    let out = dir.path().join("tas.clm");

    // (FILL + 0) * 10 is far outside the 16-bit range.
    let config = ConvertConfig::new(vec![input], "tas", 2001, &grid, &out).with_convert(10.0);
    let report = run(&config).unwrap();

    assert!(report.is_finished());
    assert_eq!(report.fill_errors, 1);
    assert_eq!(report.range_errors, 0);
    assert_eq!(report.exit_code(), nc2clm_pipeline::EXIT_VALUE_WARNINGS);
}

#[test]
fn out_of_range_values_are_counted_and_written() {
    let dir = tempdir().unwrap();
    let grid = write_grid(dir.path(), &[(10, 50)], 1.0, ByteOrder::native());
    let input = FixtureBuilder::new("tas.nc", "tas", 365)
        .with_value(5, 0, 0, 5000.0)
        .write(dir.path());
    let out = dir.path().join("tas.clm");

    let config = ConvertConfig::new(vec![input], "tas", 2001, &grid, &out).with_convert(10.0);
    let report = run(&config).unwrap();

    assert_eq!(report.range_errors, 1);
    assert_eq!(report.fill_errors, 0);
    let (_, values) = read_values(&out);
    assert_eq!(values[5], f32::from(i16::MAX));
}

#[test]
fn short_output_rounds_to_nearest() {
    let dir = tempdir().unwrap();
    let grid = write_grid(dir.path(), &TWO_CELLS, 1.0, ByteOrder::native());
    let fx = FixtureBuilder::new("tas.nc", "tas", 365);
    let input = fx.write(dir.path());
    let out = dir.path().join("tas.clm");

    let (offset, convert) = (-0.3, 7.0);
    let config = ConvertConfig::new(vec![input], "tas", 2001, &grid, &out)
        .with_offset(offset)
        .with_convert(convert);
    run(&config).unwrap();

    let (info, values) = read_values(&out);
    assert_eq!(info.header.version, 2);
    for (cell, (j, i)) in [(0, (0, 0)), (1, (1, 1))] {
        let series = fx.series(j, i);
        for (band, &stored) in bands(&values, 2, 0, cell).iter().enumerate() {
            let exact = (series[band] + offset) * convert;
            assert!((stored - exact).abs() <= 0.5 + 1e-3, "band {band}: {stored} vs {exact}");
        }
    }
}

// ---------------------------------------------------------------------------
// Header and layout
// ---------------------------------------------------------------------------

#[test]
fn year_count_and_length_cover_all_inputs() {
    for precision in [OutputPrecision::Short, OutputPrecision::Float] {
        let dir = tempdir().unwrap();
        let grid = write_grid(dir.path(), &TWO_CELLS, 1.0, ByteOrder::native());
        let a = FixtureBuilder::new("a.nc", "tas", 730).write(dir.path());
        let b = FixtureBuilder::new("b.nc", "tas", 400).write(dir.path());
        let out = dir.path().join("out.clm");

        let config = ConvertConfig::new(vec![a, b], "tas", 1901, &grid, &out)
            .with_scalar(0.1)
            .with_precision(precision);
        let report = run(&config).unwrap();
        assert_eq!(report.years_written, 3);
        assert_eq!(report.header.n_years, 3);

        let bytes = std::fs::read(&out).unwrap();
        let info = read_clm_header(bytes.as_slice()).unwrap();
        assert_eq!(info.header.n_years, 3);
        assert_eq!(info.header.first_year, 1901);
        assert_eq!(info.header.n_cells, 2);
        assert_eq!(info.header.n_bands, 365);
        assert_eq!(info.header.scalar, 0.1);
        assert_eq!(info.header.cell_size, 1.0);
        assert_eq!(
            bytes.len(),
            precision.header_len() + 3 * 2 * 365 * precision.value_size()
        );
    }
}

#[test]
fn second_file_continues_after_first() {
    let dir = tempdir().unwrap();
    let grid = write_grid(dir.path(), &[(10, 50)], 1.0, ByteOrder::native());
    let a = FixtureBuilder::new("a.nc", "tas", 365)
        .with_series(0, 0, &[1.0; 365])
        .write(dir.path());
    let b = FixtureBuilder::new("b.nc", "tas", 365)
        .with_series(0, 0, &[2.0; 365])
        .write(dir.path());
    let out = dir.path().join("out.clm");

    let config = ConvertConfig::new(vec![a, b], "tas", 2001, &grid, &out)
        .with_precision(OutputPrecision::Float);
    run(&config).unwrap();

    let (_, values) = read_values(&out);
    assert!(bands(&values, 1, 0, 0).iter().all(|&v| v == 1.0));
    assert!(bands(&values, 1, 1, 0).iter().all(|&v| v == 2.0));
}

#[test]
fn short_time_axis_is_padded_with_transformed_zero() {
    let dir = tempdir().unwrap();
    let grid = write_grid(dir.path(), &[(10, 50)], 1.0, ByteOrder::native());
    // Two 365-day years starting in a leap year: the second year is one
    // day short.
    let input = FixtureBuilder::new("tas.nc", "tas", 730)
        .with_series(0, 0, &[5.0; 730])
        .write(dir.path());
    let out = dir.path().join("out.clm");

    let config = ConvertConfig::new(vec![input], "tas", 2000, &grid, &out)
        .with_offset(1.0)
        .with_precision(OutputPrecision::Float);
    let report = run(&config).unwrap();
    assert_eq!(report.years_written, 2);

    let (_, values) = read_values(&out);
    let second = bands(&values, 1, 1, 0);
    assert_eq!(second[363], 6.0);
    assert_eq!(second[364], 1.0);
}

#[test]
fn byte_swapped_grid_gives_same_output() {
    let dir = tempdir().unwrap();
    let input = FixtureBuilder::new("tas.nc", "tas", 365).write(dir.path());

    let mut outputs = Vec::new();
    for order in [ByteOrder::native(), ByteOrder::native().swapped()] {
        let sub = dir.path().join(format!("{order:?}"));
        std::fs::create_dir(&sub).unwrap();
        let grid = write_grid(&sub, &TWO_CELLS, 1.0, order);
        let out = sub.join("out.clm");
        let config = ConvertConfig::new(vec![input.clone()], "tas", 2001, &grid, &out);
        run(&config).unwrap();
        outputs.push(std::fs::read(&out).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
}

// ---------------------------------------------------------------------------
// Fatal errors
// ---------------------------------------------------------------------------

#[test]
fn unmatched_cell_aborts_with_grid_error() {
    let dir = tempdir().unwrap();
    let grid = write_grid(dir.path(), &[(10, 50), (12, 51)], 1.0, ByteOrder::native());
    let input = FixtureBuilder::new("tas.nc", "tas", 365).write(dir.path());
    let out = dir.path().join("out.clm");

    let config = ConvertConfig::new(vec![input], "tas", 2001, &grid, &out);
    let report = run(&config).unwrap();

    let RunStatus::Aborted(PipelineError::Grid(GridError::Mismatch { cells })) = &report.status
    else {
        panic!("expected grid mismatch, got {:?}", report.status);
    };
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].cell, 1);
    assert_eq!(cells[0].lon, 12.0);
    assert_eq!(cells[0].lat, 51.0);
    assert!(!cells[0].lon_found);
    assert!(cells[0].lat_found);
    assert_eq!(report.exit_code(), nc2clm_pipeline::EXIT_GRID_ERROR);

    // Header is still readable, with no years.
    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(bytes.len(), OutputPrecision::Short.header_len());
    assert_eq!(read_clm_header(bytes.as_slice()).unwrap().header.n_years, 0);
}

#[test]
fn failing_second_file_keeps_first_files_years() {
    let dir = tempdir().unwrap();
    let grid = write_grid(dir.path(), &TWO_CELLS, 1.0, ByteOrder::native());
    let a = FixtureBuilder::new("a.nc", "tas", 365).write(dir.path());
    let b = FixtureBuilder::new("b.nc", "pr", 365).write(dir.path());
    let out = dir.path().join("out.clm");

    let config = ConvertConfig::new(vec![a, b], "tas", 2001, &grid, &out);
    let report = run(&config).unwrap();

    assert!(matches!(
        report.status,
        RunStatus::Aborted(PipelineError::Io(nc2clm_io::IoError::MissingVariable { .. }))
    ));
    assert_eq!(report.exit_code(), nc2clm_pipeline::EXIT_FILE_ERROR);
    assert_eq!(report.years_written, 1);

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(read_clm_header(bytes.as_slice()).unwrap().header.n_years, 1);
    assert_eq!(bytes.len(), 43 + 2 * 365 * 2);
}

#[test]
fn unreadable_grid_leaves_no_output() {
    let dir = tempdir().unwrap();
    let grid = dir.path().join("grid.bin");
    std::fs::write(&grid, b"LPJGRID\xff\xff\xff\x7f").unwrap();
    let input = FixtureBuilder::new("tas.nc", "tas", 365).write(dir.path());
    let out = dir.path().join("out.clm");

    let config = ConvertConfig::new(vec![input], "tas", 2001, &grid, &out);
    let err = run(&config).unwrap_err();
    assert!(err.is_grid_error());
    assert!(!out.exists());
}
