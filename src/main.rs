mod cli;
mod config;
mod convert;
mod logging;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use nc2clm_io::read_clm_header;
use nc2clm_pipeline::{EXIT_USAGE_ERROR, PipelineError, RunReport, RunStatus};
use tracing::{error, info, warn};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(cli::parse_error_exit_code(&e));
        }
    };
    logging::init(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<PipelineError>()
                .map_or(EXIT_USAGE_ERROR, PipelineError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let run_toml = cli.run_toml()?;
    let config = convert::build_convert_config(&run_toml)?;

    info!(
        inputs = config.inputs().len(),
        variable = config.variable(),
        first_year = config.first_year(),
        grid = %config.grid().display(),
        offset = config.offset(),
        convert = config.convert(),
        scalar = config.scalar(),
        output = %config.output().display(),
        precision = ?config.precision(),
        "starting conversion"
    );
    if config.convert() == 0.0 {
        warn!("convert is 0, every output value will be 0");
    }
    if config.scalar() == 0.0 {
        warn!("scalar is 0, LPJmL will multiply every value by 0");
    }

    let report = nc2clm_pipeline::run(&config)?;
    Ok(conclude(&report, config.output()))
}

/// Logs how the run ended and the header actually written, then returns
/// the run's exit status. Failing to read the header back only warns.
fn conclude(report: &RunReport, output: &Path) -> u8 {
    match &report.status {
        RunStatus::Finished => info!(years = report.years_written, "conversion finished"),
        RunStatus::Aborted(e) if e.is_grid_error() => {
            error!("program aborted prematurely because of grid error");
        }
        RunStatus::Aborted(_) => {
            error!("program aborted prematurely because of NetCDF file error");
        }
    }

    if let Err(e) = log_output_header(output) {
        warn!(error = %format!("{e:#}"), "cannot read back output header");
    }

    report.exit_code()
}

fn log_output_header(path: &Path) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("failed to reopen {}", path.display()))?;
    let written = read_clm_header(BufReader::new(file))?;
    info!(
        version = written.header.version,
        first_year = written.header.first_year,
        n_years = written.header.n_years,
        n_cells = written.header.n_cells,
        n_bands = written.header.n_bands,
        cell_size = written.header.cell_size,
        scalar = written.header.scalar,
        datatype = written.datatype,
        "output header"
    );
    Ok(())
}
