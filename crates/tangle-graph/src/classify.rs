//! Module classification: where does a module name come from?
//!
//! A name is either compiled from project source (`Local`), supplied by the
//! host as a native file (`Native`), or provided by a dependency package
//! (`Foreign`). The crawl only looks inside `Local` modules.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::{CrawlEnv, PackageId};
use crate::module_name::ModuleName;
use crate::runtime::Runtime;

/// Prefix marking host-supplied modules.
pub const NATIVE_PREFIX: &str = "Native";

/// Extension of native module files.
pub const NATIVE_EXTENSION: &str = "js";

/// Result of classifying one module name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Compiled from project source at this path.
    Local(PathBuf),
    /// Supplied by the host environment.
    Native(PathBuf),
    /// Provided by a dependency package.
    Foreign(PackageId),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "local file {}", path.display()),
            Location::Native(path) => write!(f, "native file {}", path.display()),
            Location::Foreign(package) => write!(f, "package {package}"),
        }
    }
}

/// Why a module name could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("module '{name}' not found (searched {})", format_paths(.searched))]
    NotFound {
        name: ModuleName,
        searched: Vec<PathBuf>,
    },

    #[error("module '{name}' is provided by more than one source: {}", format_locations(.candidates))]
    Ambiguous {
        name: ModuleName,
        candidates: Vec<Location>,
    },
}

fn format_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_locations(candidates: &[Location]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decides where a module comes from.
#[async_trait]
pub trait ModuleClassifier: Send + Sync + fmt::Debug {
    async fn classify(&self, env: &CrawlEnv, name: &ModuleName) -> Result<Location, ClassifyError>;
}

/// Classifier over the project's directories and declared dependencies.
///
/// Resolution order:
/// 1. `Native.*` names map to `<native dir>/<Rest/As/Path>.js`.
/// 2. Every source directory is probed for `<Dotted/Path>.<ext>`.
/// 3. Dependency packages that expose the name.
///
/// Steps 2 and 3 are collected together: exactly one hit is the answer, more
/// than one is `Ambiguous`, none is `NotFound`.
#[derive(Debug, Clone)]
pub struct DirectoryClassifier {
    runtime: Arc<dyn Runtime>,
}

impl DirectoryClassifier {
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self { runtime }
    }

    async fn classify_native(
        &self,
        env: &CrawlEnv,
        name: &ModuleName,
        rest: &str,
    ) -> Result<Location, ClassifyError> {
        let mut path = env.native_root();
        path.extend(rest.split('.'));
        path.set_extension(NATIVE_EXTENSION);

        if self.runtime.is_file(&path).await {
            Ok(Location::Native(path))
        } else {
            Err(ClassifyError::NotFound {
                name: name.clone(),
                searched: vec![path],
            })
        }
    }
}

#[async_trait]
impl ModuleClassifier for DirectoryClassifier {
    async fn classify(&self, env: &CrawlEnv, name: &ModuleName) -> Result<Location, ClassifyError> {
        if let Some(rest) = name.strip_prefix(NATIVE_PREFIX) {
            return self.classify_native(env, name, rest).await;
        }

        let relative = name.to_relative_path(&env.extension);
        let mut searched = Vec::new();
        let mut candidates = Vec::new();

        for dir in env.source_roots() {
            let path = dir.join(&relative);
            if self.runtime.is_file(&path).await {
                candidates.push(Location::Local(path.clone()));
            }
            searched.push(path);
        }

        candidates.extend(env.providers_of(name).cloned().map(Location::Foreign));

        match candidates.len() {
            0 => Err(ClassifyError::NotFound {
                name: name.clone(),
                searched,
            }),
            1 => Ok(candidates.remove(0)),
            _ => Err(ClassifyError::Ambiguous {
                name: name.clone(),
                candidates,
            }),
        }
    }
}
