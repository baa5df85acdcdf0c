//! Immutable per-crawl context.
//!
//! A `CrawlEnv` is built once before crawling starts and shared read-only by
//! every worker through an `Arc`.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::module_name::ModuleName;

/// Default source file extension.
pub const DEFAULT_EXTENSION: &str = "tgl";

/// Whether the project is an application or a publishable library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Application,
    Library,
}

/// Name and version of a package, handed to the header parser.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageId {
    pub name: String,
    pub version: String,
}

impl PackageId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Project-level facts the crawl needs to validate module headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub package: PackageId,
    pub kind: ProjectKind,
    /// Whether `effect module` headers are allowed.
    pub effect_modules: bool,
}

impl ProjectDescriptor {
    pub fn application(package: PackageId) -> Self {
        Self {
            package,
            kind: ProjectKind::Application,
            effect_modules: false,
        }
    }

    pub fn library(package: PackageId) -> Self {
        Self {
            package,
            kind: ProjectKind::Library,
            effect_modules: false,
        }
    }

    pub fn with_effect_modules(mut self, enabled: bool) -> Self {
        self.effect_modules = enabled;
        self
    }

    pub fn is_application(&self) -> bool {
        self.kind == ProjectKind::Application
    }

    pub fn is_library(&self) -> bool {
        self.kind == ProjectKind::Library
    }

    pub fn effect_modules_enabled(&self) -> bool {
        self.effect_modules
    }
}

/// A dependency package and the modules it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignPackage {
    pub id: PackageId,
    pub modules: BTreeSet<ModuleName>,
}

/// Configuration shared by every crawl worker.
#[derive(Debug, Clone)]
pub struct CrawlEnv {
    /// Project root; relative directories below are joined onto it.
    pub root: PathBuf,
    pub project: ProjectDescriptor,
    /// Modules the project exposes to its dependents.
    pub exposed: BTreeSet<ModuleName>,
    pub source_dirs: Vec<PathBuf>,
    pub native_dir: PathBuf,
    pub extension: String,
    pub dependencies: Vec<ForeignPackage>,
}

impl CrawlEnv {
    /// Create a context with one `src` source directory and no dependencies.
    pub fn new(root: impl Into<PathBuf>, project: ProjectDescriptor) -> Self {
        Self {
            root: root.into(),
            project,
            exposed: BTreeSet::new(),
            source_dirs: vec![PathBuf::from("src")],
            native_dir: PathBuf::from("native"),
            extension: DEFAULT_EXTENSION.to_string(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_source_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.source_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_native_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.native_dir = dir.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_exposed(mut self, modules: impl IntoIterator<Item = ModuleName>) -> Self {
        self.exposed = modules.into_iter().collect();
        self
    }

    pub fn with_dependency(mut self, package: ForeignPackage) -> Self {
        self.dependencies.push(package);
        self
    }

    /// Absolute source directories, in search order.
    pub fn source_roots(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.source_dirs.iter().map(|dir| self.resolve(dir))
    }

    pub fn native_root(&self) -> PathBuf {
        self.resolve(&self.native_dir)
    }

    /// Dependency packages that expose `name`.
    pub fn providers_of<'a>(
        &'a self,
        name: &'a ModuleName,
    ) -> impl Iterator<Item = &'a PackageId> + 'a {
        self.dependencies
            .iter()
            .filter(move |package| package.modules.contains(name))
            .map(|package| &package.id)
    }

    fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        }
    }
}
