//! Error handling for the tangle CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`, and
//! [`cli_error_to_miette`] turns the result into a report for the terminal.

mod diagnostic;

use std::path::PathBuf;

use tangle_config::ConfigError;
use tangle_graph::{CrawlError, ModuleNameError};
use thiserror::Error;

pub use diagnostic::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Manifest discovery, parsing, or validation failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The crawl itself failed
    #[error(transparent)]
    Crawl(#[from] CrawlError),

    /// A module name given on the command line is malformed
    #[error("Invalid module name: {0}")]
    InvalidModule(#[from] ModuleNameError),

    /// Output could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
