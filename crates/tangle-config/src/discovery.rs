//! Manifest discovery and layered loading.
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. `tangle.toml`
//! 3. `TANGLE_` environment variables (`TANGLE_PROJECT__KIND=library`)
//! 4. Explicit overrides, usually from the command line

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use tangle_graph::CrawlEnv;

use crate::MANIFEST_FILE;
use crate::error::{ConfigError, Result};
use crate::manifest::Manifest;

/// A manifest together with the directory it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub root: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
}

impl Project {
    pub fn crawl_env(&self) -> Result<CrawlEnv> {
        self.manifest.crawl_env(&self.root)
    }
}

/// Values that take precedence over every other source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub max_parallel: Option<usize>,
}

/// File-based manifest discovery.
///
/// Looks for `tangle.toml` in the start directory and then in each ancestor.
///
/// # Example
///
/// ```no_run
/// use tangle_config::{ConfigDiscovery, Overrides};
///
/// let project = ConfigDiscovery::new(".").load(&Overrides::default()).unwrap();
/// println!("{}", project.root.display());
/// ```
pub struct ConfigDiscovery {
    start: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(start: impl AsRef<Path>) -> Self {
        Self {
            start: start.as_ref().to_path_buf(),
        }
    }

    /// Nearest `tangle.toml` at or above the start directory.
    pub fn find(&self) -> Option<PathBuf> {
        self.start
            .ancestors()
            .map(|dir| dir.join(MANIFEST_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Find, merge, and validate the manifest.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no manifest exists at or above the
    /// start directory.
    pub fn load(&self, overrides: &Overrides) -> Result<Project> {
        let manifest_path = self
            .find()
            .ok_or_else(|| ConfigError::NotFound(self.start.clone()))?;
        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.start.clone());

        tracing::debug!(path = %manifest_path.display(), "Loading manifest");
        let manifest = load_manifest(&manifest_path, overrides)?;

        Ok(Project {
            root,
            manifest_path,
            manifest,
        })
    }
}

/// Merge every source for the manifest at `path` and validate the result.
pub fn load_manifest(path: &Path, overrides: &Overrides) -> Result<Manifest> {
    let manifest: Manifest = figment(path, overrides).extract()?;
    manifest.validate()?;
    Ok(manifest)
}

fn figment(path: &Path, overrides: &Overrides) -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(Manifest::default()))
        .merge(Toml::file(path))
        // TANGLE_CRAWL__MAX_PARALLEL -> crawl.max-parallel
        .merge(
            Env::prefixed("TANGLE_")
                .split("__")
                .map(|key| key.as_str().replace('_', "-").into()),
        );

    if let Some(limit) = overrides.max_parallel {
        figment = figment.merge(Serialized::default("crawl.max-parallel", limit));
    }

    figment
}

