//! The `tangle.toml` project manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tangle_graph::env::DEFAULT_EXTENSION;
use tangle_graph::{
    CrawlEnv, CrawlOptions, ForeignPackage, ModuleName, PackageId, ProjectDescriptor, ProjectKind,
};

use crate::error::{ConfigError, Result};

/// Whole manifest, as written on disk.
///
/// Module names are kept as strings here and validated by
/// [`Manifest::validate`], so a typo is reported with the field it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub project: ProjectSection,
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencySection>,
    #[serde(default)]
    pub crawl: CrawlSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectSection {
    pub name: String,
    pub version: String,
    pub kind: ProjectKind,
    pub effect_modules: bool,
    pub source_directories: Vec<PathBuf>,
    pub native_directory: PathBuf,
    pub extension: String,
    pub exposed_modules: Vec<String>,
    pub entry_modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencySection {
    pub version: String,
    #[serde(default)]
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            project: ProjectSection {
                name: String::new(),
                version: "0.0.0".to_string(),
                kind: ProjectKind::Application,
                effect_modules: false,
                source_directories: vec![PathBuf::from("src")],
                native_directory: PathBuf::from("native"),
                extension: DEFAULT_EXTENSION.to_string(),
                exposed_modules: Vec::new(),
                entry_modules: Vec::new(),
            },
            dependencies: BTreeMap::new(),
            crawl: CrawlSection::default(),
        }
    }
}

fn module_names<'a>(
    field: &str,
    names: impl IntoIterator<Item = &'a String>,
) -> Result<Vec<ModuleName>> {
    names
        .into_iter()
        .map(|name| {
            ModuleName::new(name).map_err(|source| ConfigError::InvalidModuleName {
                field: field.to_string(),
                source,
            })
        })
        .collect()
}

impl Manifest {
    pub fn package(&self) -> PackageId {
        PackageId::new(&self.project.name, &self.project.version)
    }

    pub fn validate(&self) -> Result<()> {
        let project = &self.project;

        if project.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if project.version.trim().is_empty() {
            return Err(ConfigError::EmptyVersion);
        }
        if project.source_directories.is_empty() {
            return Err(ConfigError::NoSourceDirectories);
        }

        module_names("project.exposed-modules", &project.exposed_modules)?;
        module_names("project.entry-modules", &project.entry_modules)?;
        for (package, dependency) in &self.dependencies {
            module_names(&format!("dependencies.\"{package}\".modules"), &dependency.modules)?;
        }

        match project.kind {
            ProjectKind::Library if project.exposed_modules.is_empty() => {
                return Err(ConfigError::NoExposedModules(project.name.clone()));
            }
            ProjectKind::Application if project.entry_modules.is_empty() => {
                return Err(ConfigError::NoEntryModules(project.name.clone()));
            }
            _ => {}
        }

        if self.crawl.max_parallel == Some(0) {
            return Err(ConfigError::ZeroParallelism);
        }

        Ok(())
    }

    /// Crawl roots: entry modules for applications, exposed modules for
    /// libraries.
    pub fn root_modules(&self) -> Result<Vec<ModuleName>> {
        match self.project.kind {
            ProjectKind::Application => {
                module_names("project.entry-modules", &self.project.entry_modules)
            }
            ProjectKind::Library => {
                module_names("project.exposed-modules", &self.project.exposed_modules)
            }
        }
    }

    /// Build the crawl context for a project rooted at `root`.
    pub fn crawl_env(&self, root: &Path) -> Result<CrawlEnv> {
        let project = &self.project;
        let descriptor = ProjectDescriptor {
            package: self.package(),
            kind: project.kind,
            effect_modules: project.effect_modules,
        };

        let mut env = CrawlEnv::new(root, descriptor)
            .with_source_dirs(project.source_directories.iter().cloned())
            .with_native_dir(&project.native_directory)
            .with_extension(&project.extension)
            .with_exposed(module_names(
                "project.exposed-modules",
                &project.exposed_modules,
            )?);

        for (package, dependency) in &self.dependencies {
            let modules = module_names(
                &format!("dependencies.\"{package}\".modules"),
                &dependency.modules,
            )?;
            env = env.with_dependency(ForeignPackage {
                id: PackageId::new(package, &dependency.version),
                modules: modules.into_iter().collect(),
            });
        }

        Ok(env)
    }

    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            max_parallel: self.crawl.max_parallel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> Manifest {
        let mut manifest = Manifest::default();
        manifest.project.name = "acme/app".to_string();
        manifest.project.version = "1.0.0".to_string();
        manifest.project.entry_modules = vec!["Main".to_string()];
        manifest
    }

    #[test]
    fn default_manifest_needs_a_name() {
        assert!(matches!(Manifest::default().validate(), Err(ConfigError::EmptyName)));
        assert!(app().validate().is_ok());
    }

    #[test]
    fn application_needs_entry_modules() {
        let mut manifest = app();
        manifest.project.entry_modules.clear();
        assert!(matches!(manifest.validate(), Err(ConfigError::NoEntryModules(_))));
    }

    #[test]
    fn library_needs_exposed_modules() {
        let mut manifest = app();
        manifest.project.kind = ProjectKind::Library;
        assert!(matches!(manifest.validate(), Err(ConfigError::NoExposedModules(_))));

        manifest.project.exposed_modules = vec!["Lib".to_string()];
        assert!(manifest.validate().is_ok());
        assert_eq!(
            manifest.root_modules().unwrap(),
            vec![ModuleName::new("Lib").unwrap()]
        );
    }

    #[test]
    fn bad_dependency_module_names_field() {
        let mut manifest = app();
        manifest.dependencies.insert(
            "acme/json".to_string(),
            DependencySection {
                version: "2.0.0".to_string(),
                modules: vec!["json.decode".to_string()],
            },
        );
        match manifest.validate() {
            Err(ConfigError::InvalidModuleName { field, .. }) => {
                assert_eq!(field, "dependencies.\"acme/json\".modules");
            }
            other => panic!("expected InvalidModuleName, got {other:?}"),
        }
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let mut manifest = app();
        manifest.crawl.max_parallel = Some(0);
        assert!(matches!(manifest.validate(), Err(ConfigError::ZeroParallelism)));
    }

    #[test]
    fn crawl_env_carries_everything() {
        let mut manifest = app();
        manifest.project.source_directories = vec![PathBuf::from("src"), PathBuf::from("vendor")];
        manifest.project.effect_modules = true;
        manifest.dependencies.insert(
            "acme/json".to_string(),
            DependencySection {
                version: "2.0.0".to_string(),
                modules: vec!["Json.Decode".to_string()],
            },
        );
        manifest.crawl.max_parallel = Some(8);

        let env = manifest.crawl_env(Path::new("/work/app")).unwrap();
        assert_eq!(env.root, PathBuf::from("/work/app"));
        assert_eq!(env.project.package, PackageId::new("acme/app", "1.0.0"));
        assert!(env.project.is_application());
        assert!(env.project.effect_modules_enabled());
        assert_eq!(
            env.source_roots().collect::<Vec<_>>(),
            vec![PathBuf::from("/work/app/src"), PathBuf::from("/work/app/vendor")]
        );
        assert_eq!(env.dependencies.len(), 1);
        assert_eq!(env.dependencies[0].id, PackageId::new("acme/json", "2.0.0"));
        assert_eq!(manifest.crawl_options().max_parallel, Some(8));
    }
}
