use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use nc2clm_pipeline::EXIT_USAGE_ERROR;
use tracing::warn;

use crate::config::RunToml;

/// Flag accepted after the output path to select float output.
const LEGACY_FLOAT_FLAG: &str = "-float";

/// Number of positional arguments following the input file names.
const FIXED_POSITIONALS: usize = 7;

/// Convert daily NetCDF climate data into LPJmL CLM input files.
#[derive(Debug, Parser)]
#[command(
    name = "nc2clm",
    version,
    about = "Convert daily NetCDF climate data into LPJmL CLM input files",
    override_usage = "nc2clm [OPTIONS] <N> <FILE>... <VAR> <FIRST_YEAR> <GRID> <OFFSET> <CONVERT> <SCALAR> <OUTPUT> [-float]\n       nc2clm [OPTIONS] --config <TOML>"
)]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Read the run description from a TOML file instead of positionals.
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Write 32-bit float values instead of rounded 16-bit integers.
    #[arg(long)]
    pub float: bool,

    /// Grid header field that converts stored cell coordinates to degrees.
    #[arg(long, value_name = "cellsize|scalar")]
    pub coordinate_scale: Option<String>,

    /// number_of_infiles infile... var first_year grid offset convert
    /// scalar outfile [-float]
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

/// Exit status for a failed parse: 0 for `--help` and `--version`,
/// [`EXIT_USAGE_ERROR`] for anything else.
pub fn parse_error_exit_code(err: &clap::Error) -> u8 {
    if err.exit_code() == 0 {
        0
    } else {
        EXIT_USAGE_ERROR
    }
}

impl Cli {
    /// Builds the run description from `--config` or the positionals, then
    /// applies the flag overrides.
    pub fn run_toml(&self) -> Result<RunToml> {
        let mut toml = match &self.config {
            Some(path) => {
                if !self.args.is_empty() {
                    bail!("positional arguments cannot be combined with --config");
                }
                RunToml::load(path)?
            }
            None => parse_positionals(&self.args)?,
        };
        if self.float {
            toml.float = true;
        }
        if let Some(scale) = &self.coordinate_scale {
            toml.coordinate_scale = scale.clone();
        }
        Ok(toml)
    }
}

fn parse_number<T>(value: &str, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid {name}: {value:?}"))
}

/// Parses `N file_1 .. file_N var first_year grid offset convert scalar
/// out [-float]`.
///
/// Arguments after the output path other than `-float` are reported and
/// ignored.
pub fn parse_positionals(args: &[String]) -> Result<RunToml> {
    let Some(first) = args.first() else {
        bail!("missing arguments; see --help");
    };
    let n_inputs: usize = parse_number(first, "number of input files")?;
    if n_inputs == 0 {
        bail!("number of input files must be at least 1");
    }

    let required = 1 + n_inputs + FIXED_POSITIONALS;
    if args.len() < required {
        bail!(
            "expected at least {required} arguments for {n_inputs} input file(s), got {}",
            args.len()
        );
    }

    let inputs = args[1..=n_inputs].iter().map(PathBuf::from).collect();
    let rest = &args[1 + n_inputs..];
    let mut toml = RunToml {
        inputs,
        variable: rest[0].clone(),
        first_year: parse_number(&rest[1], "first year")?,
        grid: PathBuf::from(&rest[2]),
        offset: parse_number(&rest[3], "offset")?,
        convert: parse_number(&rest[4], "convert")?,
        scalar: parse_number(&rest[5], "scalar")?,
        output: PathBuf::from(&rest[6]),
        float: false,
        coordinate_scale: crate::config::default_coordinate_scale(),
    };

    for extra in &rest[FIXED_POSITIONALS..] {
        if extra == LEGACY_FLOAT_FLAG {
            toml.float = true;
        } else {
            warn!(argument = %extra, "unknown argument ignored");
        }
    }
    Ok(toml)
}
