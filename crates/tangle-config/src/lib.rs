//! Project manifest loading for tangle.
//!
//! A project is described by a `tangle.toml` at its root. [`ConfigDiscovery`]
//! finds it, merges defaults, the file, `TANGLE_` environment variables and
//! explicit overrides with `figment`, and validates the result. The
//! [`Manifest`] then produces the crawl context and root modules for
//! `tangle-graph`.

pub mod discovery;
pub mod error;
pub mod manifest;

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "tangle.toml";

pub use discovery::{ConfigDiscovery, Overrides, Project, load_manifest};
pub use error::{ConfigError, Result};
pub use manifest::{CrawlSection, DependencySection, Manifest, ProjectSection};
