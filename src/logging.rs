use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// All workspace crate targets that should receive log output.
const CRATE_TARGETS: &[&str] = &[
    "nc2clm",
    "nc2clm_calendar",
    "nc2clm_grid",
    "nc2clm_io",
    "nc2clm_pipeline",
];

/// Initialize tracing based on CLI verbosity level.
///
/// Mapping:
/// - `-q`      -> warn
/// - 0 (none)  -> info
/// - 1 (-v)    -> debug
/// - 2+ (-vv)  -> trace
///
/// Warnings and errors go to stderr, everything else to stdout.
/// `RUST_LOG` env var overrides the CLI flag if set.
pub fn init(verbosity: u8, quiet: bool) {
    let level = match (quiet, verbosity) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let default_filter: String = CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .init();
}
