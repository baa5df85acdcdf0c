//! In-memory runtime for tests.
//!
//! Files live in a map keyed by absolute path. Reads are counted per path so
//! tests can assert that a module was crawled exactly once.

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use super::{Runtime, RuntimeError, RuntimeResult};

#[derive(Debug, Default)]
pub struct MemoryRuntime {
    cwd: PathBuf,
    files: FxHashMap<PathBuf, Vec<u8>>,
    reads: Mutex<FxHashMap<PathBuf, usize>>,
}

impl MemoryRuntime {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    /// Add a file. Relative paths are placed under the cwd.
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        let path = self.absolute(path.as_ref());
        self.files.insert(path, content.into());
        self
    }

    /// How many times `path` has been read.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        let path = self.absolute(path.as_ref());
        self.reads.lock().get(&path).copied().unwrap_or(0)
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = self.absolute(path);
        *self.reads.lock().entry(path.clone()).or_insert(0) += 1;
        self.files
            .get(&path)
            .cloned()
            .ok_or(RuntimeError::FileNotFound(path))
    }

    async fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&self.absolute(path))
    }
}
