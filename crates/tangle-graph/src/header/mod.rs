//! Module headers and their validation.
//!
//! Parsing is delegated to a `HeaderParser`. This module adds the checks the
//! crawl needs on top: the declared name must match the name used to find the
//! file, and the capability tag must be allowed by the project.

mod parser;

pub use parser::{SourceHeaderParser, parse_header};

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crawl::Info;
use crate::env::{CrawlEnv, PackageId};
use crate::error::ModuleError;
use crate::module_name::ModuleName;
use crate::runtime::Runtime;

/// A module's self-declared kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleTag {
    Normal,
    /// Talks to the host through ports; applications only.
    Port,
    /// Defines a managed effect; only where the project enables it.
    Effect,
}

impl fmt::Display for ModuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleTag::Normal => f.write_str("module"),
            ModuleTag::Port => f.write_str("port module"),
            ModuleTag::Effect => f.write_str("effect module"),
        }
    }
}

/// What a header declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub tag: ModuleTag,
    pub name: ModuleName,
    pub imports: Vec<ModuleName>,
}

/// Raw parser failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct HeaderParseError {
    pub line: usize,
    pub message: String,
}

/// Extracts a `Header` from module source text.
pub trait HeaderParser: Send + Sync + fmt::Debug {
    fn parse(&self, package: &PackageId, source: &str) -> Result<Header, HeaderParseError>;
}

/// Read the file at `path` and validate its header against `expected`.
pub async fn read_valid_header(
    runtime: &dyn Runtime,
    parser: &dyn HeaderParser,
    env: &CrawlEnv,
    expected: &ModuleName,
    path: &Path,
) -> Result<Info, ModuleError> {
    let bytes = runtime
        .read_file(path)
        .await
        .map_err(|source| ModuleError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let source = String::from_utf8(bytes).map_err(|_| ModuleError::NotUtf8 {
        path: path.to_path_buf(),
    })?;

    let header = parser
        .parse(&env.project.package, &source)
        .map_err(|err| ModuleError::BadHeader {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    validate_header(env, expected, path, header)
}

/// Check identity and capability tag of an already-parsed header.
pub fn validate_header(
    env: &CrawlEnv,
    expected: &ModuleName,
    path: &Path,
    header: Header,
) -> Result<Info, ModuleError> {
    if &header.name != expected {
        return Err(ModuleError::BadName {
            path: path.to_path_buf(),
            expected: expected.clone(),
            declared: header.name,
        });
    }

    match header.tag {
        ModuleTag::Normal => {}
        ModuleTag::Port if env.project.is_application() => {}
        ModuleTag::Port => {
            return Err(ModuleError::PortsInPackage {
                path: path.to_path_buf(),
            });
        }
        ModuleTag::Effect if env.project.effect_modules_enabled() => {}
        ModuleTag::Effect => {
            return Err(ModuleError::EffectsUnexpected {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(Info {
        path: path.to_path_buf(),
        deps: header.imports,
    })
}
