//! Logging setup for the tangle CLI.
//!
//! Library crates only emit `tracing` events; this module installs the
//! subscriber that prints them. Log lines go to stderr so that command output
//! on stdout (`tangle order`) stays pipeable.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "tangle_graph=debug,tangle_config=debug,tangle_cli=debug";
const QUIET_FILTER: &str = "tangle_graph=error,tangle_config=error,tangle_cli=error";
const DEFAULT_FILTER: &str = "tangle_graph=info,tangle_config=info,tangle_cli=info";

/// Pick the filter for the given flags.
///
/// Order of precedence:
/// 1. `--verbose`: debug for tangle crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`
/// 4. info for tangle crates
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
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}
