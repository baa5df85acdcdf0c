//! Error types for crawling.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::classify::ClassifyError;
use crate::module_name::ModuleName;
use crate::runtime::RuntimeError;

/// Why a single module could not be added to the graph.
///
/// Recorded against the name that was requested, never the name a file
/// declares for itself.
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("{} is not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },

    #[error("bad module header in {}: {message}", path.display())]
    BadHeader { path: PathBuf, message: String },

    #[error("{} declares module '{declared}' but was imported as '{expected}'", path.display())]
    BadName {
        path: PathBuf,
        expected: ModuleName,
        declared: ModuleName,
    },

    #[error("{} is a port module, which only applications may contain", path.display())]
    PortsInPackage { path: PathBuf },

    #[error("{} is an effect module, but effect modules are not enabled", path.display())]
    EffectsUnexpected { path: PathBuf },

    #[error("crawl worker stopped before reporting a result")]
    WorkerLost,
}

impl ModuleError {
    /// The file the error refers to, if there is one.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ModuleError::Unreadable { path, .. }
            | ModuleError::NotUtf8 { path }
            | ModuleError::BadHeader { path, .. }
            | ModuleError::BadName { path, .. }
            | ModuleError::PortsInPackage { path }
            | ModuleError::EffectsUnexpected { path } => Some(path),
            ModuleError::Classify(_) | ModuleError::WorkerLost => None,
        }
    }
}

/// A strongly connected group of local modules.
///
/// `modules` is ordered along the cycle, starting from the smallest name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("import cycle: {}", render_cycle(.modules))]
pub struct CycleError {
    pub modules: Vec<ModuleName>,
}

fn render_cycle(modules: &[ModuleName]) -> String {
    let mut parts: Vec<&str> = modules.iter().map(ModuleName::as_str).collect();
    if let Some(first) = modules.first() {
        parts.push(first.as_str());
    }
    parts.join(" -> ")
}

/// Whole-crawl failure.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("no root modules to crawl")]
    NoRoots,

    #[error("{} module(s) failed: {}", problems.len(), list_names(problems))]
    Modules {
        problems: BTreeMap<ModuleName, ModuleError>,
        /// First importer of every dispatched non-root module.
        importers: BTreeMap<ModuleName, ModuleName>,
    },

    #[error(transparent)]
    Cycle(#[from] CycleError),
}

fn list_names(problems: &BTreeMap<ModuleName, ModuleError>) -> String {
    problems
        .keys()
        .map(ModuleName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl CrawlError {
    /// Path of first importers from a root down to `name`, inclusive.
    ///
    /// Returns just `[name]` for roots and for errors that carry no importer
    /// information.
    pub fn import_chain(&self, name: &ModuleName) -> Vec<ModuleName> {
        let CrawlError::Modules { importers, .. } = self else {
            return vec![name.clone()];
        };

        let mut chain = vec![name.clone()];
        let mut current = name;
        while let Some(parent) = importers.get(current) {
            if chain.len() > importers.len() {
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        chain.reverse();
        chain
    }
}
