//! Error types for manifest loading and validation.

use std::path::PathBuf;

use tangle_graph::ModuleNameError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no tangle.toml found in {} or any parent directory", .0.display())]
    NotFound(PathBuf),

    // Parsing/merging errors from figment
    #[error("invalid configuration: {0}")]
    Invalid(String),

    // Schema validation errors
    #[error("project name is empty")]
    EmptyName,

    #[error("project version is empty")]
    EmptyVersion,

    #[error("no source directories configured")]
    NoSourceDirectories,

    #[error("library '{0}' does not expose any modules")]
    NoExposedModules(String),

    #[error("application '{0}' has no entry modules")]
    NoEntryModules(String),

    #[error("invalid module name in {field}: {source}")]
    InvalidModuleName {
        field: String,
        #[source]
        source: ModuleNameError,
    },

    #[error("crawl.max-parallel must be at least 1")]
    ZeroParallelism,
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}
