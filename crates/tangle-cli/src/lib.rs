//! Tangle CLI - resolve a project's module graph before compiling it.
//!
//! # Architecture
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `crawl` and `order` implementations
//! - [`error`] - error types and miette rendering
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - terminal status messages

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
