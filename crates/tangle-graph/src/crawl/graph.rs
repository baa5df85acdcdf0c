use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::cycles::check_cycles;
use crate::env::PackageId;
use crate::error::{CycleError, ModuleError};
use crate::module_name::ModuleName;

/// What a local module's header told us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub path: PathBuf,
    /// Declared imports, in source order.
    pub deps: Vec<ModuleName>,
}

/// A successfully resolved module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Local { name: ModuleName, info: Info },
    Native { name: ModuleName, path: PathBuf },
    Foreign { name: ModuleName, package: PackageId },
}

impl Asset {
    pub fn name(&self) -> &ModuleName {
        match self {
            Asset::Local { name, .. } | Asset::Native { name, .. } | Asset::Foreign { name, .. } => {
                name
            }
        }
    }
}

/// The single result a worker reports.
#[derive(Debug, Clone)]
pub enum Outcome {
    Found(Asset),
    /// Keyed by the requested name.
    Failed(ModuleName, ModuleError),
}

impl Outcome {
    pub fn name(&self) -> &ModuleName {
        match self {
            Outcome::Found(asset) => asset.name(),
            Outcome::Failed(name, _) => name,
        }
    }
}

/// A pending crawl request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unvisited {
    pub name: ModuleName,
    /// The module whose import caused this request; `None` for roots.
    pub parent: Option<ModuleName>,
}

impl Unvisited {
    pub fn root(name: ModuleName) -> Self {
        Self { name, parent: None }
    }

    pub fn imported_by(name: ModuleName, parent: ModuleName) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }
}

/// Every module reached by a crawl, partitioned by kind.
///
/// A name is a key in at most one of the four maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub locals: BTreeMap<ModuleName, Info>,
    pub natives: BTreeMap<ModuleName, PathBuf>,
    pub foreigns: BTreeMap<ModuleName, PackageId>,
    #[serde(skip)]
    pub problems: BTreeMap<ModuleName, ModuleError>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a worker outcome, replacing any earlier entry for the same name.
    pub fn insert(&mut self, outcome: Outcome) {
        self.remove(outcome.name());
        match outcome {
            Outcome::Found(Asset::Local { name, info }) => {
                self.locals.insert(name, info);
            }
            Outcome::Found(Asset::Native { name, path }) => {
                self.natives.insert(name, path);
            }
            Outcome::Found(Asset::Foreign { name, package }) => {
                self.foreigns.insert(name, package);
            }
            Outcome::Failed(name, err) => {
                self.problems.insert(name, err);
            }
        }
    }

    fn remove(&mut self, name: &ModuleName) {
        self.locals.remove(name);
        self.natives.remove(name);
        self.foreigns.remove(name);
        self.problems.remove(name);
    }

    pub fn contains(&self, name: &ModuleName) -> bool {
        self.locals.contains_key(name)
            || self.natives.contains_key(name)
            || self.foreigns.contains_key(name)
            || self.problems.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.locals.len() + self.natives.len() + self.foreigns.len() + self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All names in the graph, sorted.
    pub fn module_names(&self) -> Vec<&ModuleName> {
        let mut names: Vec<_> = self
            .locals
            .keys()
            .chain(self.natives.keys())
            .chain(self.foreigns.keys())
            .chain(self.problems.keys())
            .collect();
        names.sort();
        names
    }

    /// Declared imports of a local module.
    pub fn dependencies(&self, name: &ModuleName) -> Option<&[ModuleName]> {
        self.locals.get(name).map(|info| info.deps.as_slice())
    }

    /// Local modules that import `name`.
    pub fn dependents(&self, name: &ModuleName) -> Vec<&ModuleName> {
        self.locals
            .iter()
            .filter(|(_, info)| info.deps.contains(name))
            .map(|(importer, _)| importer)
            .collect()
    }

    /// Local modules ordered so that every module comes after its imports.
    pub fn build_order(&self) -> Result<Vec<ModuleName>, CycleError> {
        check_cycles(&self.locals)
    }
}
