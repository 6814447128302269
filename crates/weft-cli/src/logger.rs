//! Logging setup for the weft CLI.
//!
//! Uses `tracing-subscriber` with an `EnvFilter`. `--verbose` turns on debug
//! output for the weft crates, `--quiet` limits output to errors, and otherwise
//! `RUST_LOG` is honored with an info-level fallback.
//!
//! # Example
//!
//! ```rust,no_run
//! use weft_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("resolving plan");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "weft=debug,weft_config=debug,weft_cli=debug";
const QUIET_FILTER: &str = "weft=error,weft_config=error,weft_cli=error";
const DEFAULT_FILTER: &str = "weft=info,weft_config=info,weft_cli=info";

/// Pick the filter for the given flags. `verbose` wins over `quiet`.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global tracing subscriber. Call once, before any logging.
///
/// Log lines go to stderr so that plan JSON on stdout stays machine-readable.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be installed once per process, so these
    // only exercise filter construction.

    #[test]
    fn test_env_filter_verbose() {
        let filter = filter_for(true, true);
        assert!(filter.to_string().contains("weft_config=debug"));
    }

    #[test]
    fn test_env_filter_quiet() {
        let filter = filter_for(false, true);
        assert!(filter.to_string().contains("weft_cli=error"));
    }
}
