use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Dotted identifier of a module, e.g. `Json.Decode`.
///
/// Backed by an `Arc<str>` so the coordinator, the graph, and every worker can
/// hold copies without reallocating. Equality, ordering, and hashing are those
/// of the underlying string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleName(Arc<str>);

impl ModuleName {
    /// Parse and validate a module name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ModuleNameError> {
        let name = name.as_ref();

        if name.is_empty() {
            return Err(ModuleNameError::Empty);
        }

        for segment in name.split('.') {
            let mut chars = segment.chars();
            match chars.next() {
                None => {
                    return Err(ModuleNameError::EmptySegment {
                        name: name.to_string(),
                    });
                }
                Some(first) if !first.is_ascii_uppercase() => {
                    return Err(ModuleNameError::BadSegment {
                        name: name.to_string(),
                        segment: segment.to_string(),
                    });
                }
                Some(_) => {}
            }

            if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ModuleNameError::BadSegment {
                    name: name.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self(Arc::from(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the dot-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Relative file path for this module: `Json.Decode` -> `Json/Decode.<ext>`.
    pub fn to_relative_path(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.segments().collect();
        path.set_extension(extension);
        path
    }

    /// Strip a leading `prefix.` segment group, returning the remainder.
    pub fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        self.0
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('.'))
            .filter(|rest| !rest.is_empty())
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModuleName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for ModuleName {
    type Err = ModuleNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ModuleName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ModuleName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        ModuleName::new(value).map_err(serde::de::Error::custom)
    }
}

/// Error type for `ModuleName` construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleNameError {
    #[error("module name is empty")]
    Empty,

    #[error("module name '{name}' has an empty segment")]
    EmptySegment { name: String },

    #[error("module name '{name}' has an invalid segment '{segment}'")]
    BadSegment { name: String, segment: String },
}
