//! `tracing` subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for JSON and CSV output.
//! `RUST_LOG` always wins over the level chosen here.

use farm_config::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Default level for one-shot commands.
const COMMAND_LEVEL: &str = "warn";

/// The filter directive for a run: `-q` beats `-v`, which beats `level`.
pub fn directive(level: Option<&str>, verbose: bool, quiet: bool) -> String {
    if quiet {
        "error".to_owned()
    } else if verbose {
        "debug".to_owned()
    } else {
        level.unwrap_or(COMMAND_LEVEL).to_owned()
    }
}

pub fn init(directive: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(COMMAND_LEVEL));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A second init (tests, embedding) is not an error worth reporting.
    let _ = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
