//! File loop: drives every input through resolution, calendar mapping,
//! validation and encoding.

use std::fmt;
use std::io::{Seek, Write};
use std::path::Path;

use nc2clm_calendar::{DayPlan, VariableKind};
use nc2clm_grid::{CoordinateIndexMap, GridDefinition, GridError, read_grid_file};
use nc2clm_io::{ClmHeader, ClmWriter, SourceDataset};
use tracing::{debug, error, info};

use crate::annual::{AnnualRecord, YearInput, try_alloc};
use crate::config::ConvertConfig;
use crate::error::{EXIT_VALUE_WARNINGS, PipelineError};
use crate::validate::ErrorCounters;

/// Maximum number of source days in one year.
const MAX_SOURCE_DAYS: usize = 366;

/// Position of the run in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing started yet.
    Idle,
    /// Opening input file `index`.
    OpeningFile {
        /// Position in the input list.
        index: usize,
    },
    /// Matching grid cells against the open file's axes.
    ResolvingGrid,
    /// Converting one year of the open file.
    ProcessingYear {
        /// Calendar year.
        year: i32,
    },
    /// All years of the open file written.
    FileDone,
    /// Stopped by a fatal error.
    Aborted,
    /// All inputs converted.
    Finished,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::OpeningFile { index } => write!(f, "opening file {index}"),
            Self::ResolvingGrid => f.write_str("resolving grid"),
            Self::ProcessingYear { year } => write!(f, "processing year {year}"),
            Self::FileDone => f.write_str("file done"),
            Self::Aborted => f.write_str("aborted"),
            Self::Finished => f.write_str("finished"),
        }
    }
}

/// Mutable state owned by the file loop.
#[derive(Debug)]
struct RunState {
    stage: Stage,
    next_first_year: i32,
    total_years: usize,
    counters: ErrorCounters,
}

impl RunState {
    fn new(first_year: i32) -> Self {
        Self {
            stage: Stage::Idle,
            next_first_year: first_year,
            total_years: 0,
            counters: ErrorCounters::default(),
        }
    }

    fn enter(&mut self, next: Stage) {
        debug!(from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunStatus {
    /// Every input was converted.
    Finished,
    /// A fatal error stopped the run; the output holds the years written
    /// before it.
    Aborted(PipelineError),
}

/// Outcome of a run whose output file was created.
#[derive(Debug)]
pub struct RunReport {
    /// How the run ended.
    pub status: RunStatus,
    /// The finalised output header.
    pub header: ClmHeader,
    /// Annual records written.
    pub years_written: usize,
    /// Fill or NaN values encountered.
    pub fill_errors: u64,
    /// Values outside the 16-bit range encountered.
    pub range_errors: u64,
}

impl RunReport {
    /// Returns `true` if every input was converted.
    pub fn is_finished(&self) -> bool {
        matches!(self.status, RunStatus::Finished)
    }

    /// Process exit status: grid error, then file error, then value
    /// warnings, then 0.
    pub fn exit_code(&self) -> u8 {
        match &self.status {
            RunStatus::Aborted(e) => e.exit_code(),
            RunStatus::Finished if self.fill_errors > 0 || self.range_errors > 0 => {
                EXIT_VALUE_WARNINGS
            }
            RunStatus::Finished => 0,
        }
    }
}

/// Converts a sequence of datasets into one CLM stream.
///
/// Holds the grid and the reusable working buffers. Created before the
/// output exists so that allocation failures leave no file behind.
#[derive(Debug)]
pub struct Converter<'a> {
    config: &'a ConvertConfig,
    grid: &'a GridDefinition,
    kind: VariableKind,
    coord_scale: f64,
    record: AnnualRecord,
    source: Vec<f32>,
}

impl<'a> Converter<'a> {
    /// Prepares a conversion of `config.inputs()` onto `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Allocation`] if the annual record cannot be
    /// allocated.
    pub fn new(config: &'a ConvertConfig, grid: &'a GridDefinition) -> Result<Self, PipelineError> {
        let kind = VariableKind::from_name(config.variable());
        if kind.is_precipitation() {
            debug!(variable = config.variable(), "precipitation: leap day kept, last day dropped");
        } else {
            debug!(variable = config.variable(), "leap day folded into February");
        }
        Ok(Self {
            config,
            grid,
            kind,
            coord_scale: config.coordinate_scale().factor(grid.header()),
            record: AnnualRecord::try_new(grid.n_cells())?,
            source: Vec::new(),
        })
    }

    /// Provisional output header for this run.
    pub fn header(&self) -> ClmHeader {
        let gh = self.grid.header();
        ClmHeader::new(
            self.config.precision(),
            self.config.first_year(),
            gh.first_cell,
            gh.n_cells,
            gh.cell_size,
            self.config.scalar(),
        )
    }

    /// Converts every input into `writer` and finalises its header.
    ///
    /// Fatal errors after the output was started end the loop but still
    /// finalise the header with the years written so far; they are
    /// returned inside the report.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] only if the header cannot be
    /// finalised.
    pub fn convert<W: Write + Seek>(
        mut self,
        mut writer: ClmWriter<W>,
    ) -> Result<(RunReport, W), PipelineError> {
        let config = self.config;
        let mut state = RunState::new(config.first_year());

        let mut outcome = Ok(());
        for (index, path) in config.inputs().iter().enumerate() {
            state.enter(Stage::OpeningFile { index });
            outcome = self.convert_file(path, &mut state, &mut writer);
            if outcome.is_err() {
                break;
            }
        }

        let status = match outcome {
            Ok(()) => {
                state.enter(Stage::Finished);
                RunStatus::Finished
            }
            Err(e) => {
                error!(error = %e, "conversion aborted");
                state.enter(Stage::Aborted);
                RunStatus::Aborted(e)
            }
        };

        let years_written = writer.records_written();
        let n_years = i32::try_from(years_written).unwrap_or(i32::MAX);
        let mut header = *writer.header();
        header.n_years = n_years;
        let sink = writer.finish(n_years)?;
        debug!(
            years_written,
            total_years = state.total_years,
            "output header finalised"
        );

        let report = RunReport {
            status,
            header,
            years_written,
            fill_errors: state.counters.fill(),
            range_errors: state.counters.range(),
        };
        Ok((report, sink))
    }

    fn convert_file<W: Write + Seek>(
        &mut self,
        path: &Path,
        state: &mut RunState,
        writer: &mut ClmWriter<W>,
    ) -> Result<(), PipelineError> {
        info!(path = %path.display(), "opening dataset");
        let dataset = SourceDataset::open(path, self.config.variable())?;

        state.enter(Stage::ResolvingGrid);
        let map = CoordinateIndexMap::resolve(
            self.grid.cells(),
            dataset.lons(),
            dataset.lats(),
            self.coord_scale,
        )
        .inspect_err(|e| {
            if let GridError::Mismatch { cells } = e {
                for c in cells {
                    error!(
                        path = %path.display(),
                        cell = c.cell,
                        lon = c.lon,
                        lat = c.lat,
                        lon_found = c.lon_found,
                        lat_found = c.lat_found,
                        "cell not found in dataset"
                    );
                }
            }
        })?;

        let needed = dataset
            .slice_len()
            .checked_mul(MAX_SOURCE_DAYS)
            .ok_or_else(|| PipelineError::Allocation {
                what: "source",
                len: usize::MAX,
                reason: "grid dimensions overflow".to_string(),
            })?;
        if self.source.capacity() < needed {
            self.source = try_alloc("source", needed)?;
        }

        let n_years = dataset.n_years();
        info!(
            path = %path.display(),
            time_len = dataset.time_len(),
            n_years,
            first_year = state.next_first_year,
            "converting dataset"
        );

        let mut start = 0;
        for y in 0..n_years {
            let year = state.next_first_year + y as i32;
            state.enter(Stage::ProcessingYear { year });
            let plan = DayPlan::new(year, self.kind);
            if plan.is_leap() {
                info!(year, "calculating year (leap year)");
            } else {
                info!(year, "calculating year");
            }

            dataset.read_days(start, plan.source_days(), &mut self.source)?;
            start += plan.source_days();

            let input = YearInput {
                plan: &plan,
                source: &self.source,
                slice_len: dataset.slice_len(),
                lon_len: dataset.lons().len(),
                map: &map,
                cells: self.grid.cells(),
                coord_scale: self.coord_scale,
                fill_value: dataset.fill_value(),
                transform: self.config.transform(),
                precision: self.config.precision(),
                path,
            };
            let range = self.record.build(&input, &mut state.counters);
            info!(year, "data range in field: {}", range.summary(self.config.scalar()));

            writer.write_record(self.record.values())?;
        }

        state.enter(Stage::FileDone);
        state.next_first_year += n_years as i32;
        state.total_years += n_years;
        info!(path = %path.display(), "dataset done");
        Ok(())
    }
}

/// Runs a complete conversion described by `config`.
///
/// Reads the grid, allocates the annual record, creates the output file and
/// converts every input. Errors before the output file exists are returned
/// directly and leave no file; later fatal errors are reported in
/// [`RunReport::status`] after the header has been finalised.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`], [`PipelineError::Grid`] for an
/// unreadable grid file, [`PipelineError::Allocation`], or
/// [`PipelineError::Io`] if the output cannot be created or finalised.
pub fn run(config: &ConvertConfig) -> Result<RunReport, PipelineError> {
    config.validate()?;

    let grid = read_grid_file(config.grid())?;
    let gh = grid.header();
    info!(
        path = %config.grid().display(),
        n_cells = grid.n_cells(),
        cell_size = gh.cell_size,
        scalar = gh.scalar,
        swapped = grid.byte_order().is_swapped(),
        "grid file read"
    );

    let converter = Converter::new(config, &grid)?;
    let writer = ClmWriter::create_file(config.output(), converter.header(), config.precision())?;
    let (report, _) = converter.convert(writer)?;

    if report.fill_errors > 0 {
        info!(count = report.fill_errors, "encountered NaN or missing values");
    }
    if report.range_errors > 0 {
        info!(
            count = report.range_errors,
            "encountered values out of 16-bit range, not including NaN or missing values"
        );
    }
    Ok(report)
}
