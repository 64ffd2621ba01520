//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr
///
/// `RUST_LOG` wins when set; otherwise `debug` with `--verbose` and `warn`
/// without. Stdout stays reserved for reports and charts.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second initialization (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .try_init();
}
