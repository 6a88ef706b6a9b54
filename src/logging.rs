//! Logging configuration
//!
//! Initializes tracing for the binary. Log lines go to stderr so they never mix with
//! generated files or JSON written to stdout.

use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::VerbosityLevel;

/// Default filter directive for a verbosity level
pub fn default_level(verbosity: VerbosityLevel) -> &'static str {
    match verbosity {
        VerbosityLevel::Quiet => "error",
        VerbosityLevel::Normal => "warn",
        VerbosityLevel::Verbose => "debug",
    }
}

/// Initializes logging; `RUST_LOG` takes precedence over the verbosity level
pub fn init_logging(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
