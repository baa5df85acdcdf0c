//! Platform runtime abstraction for file access.
//!
//! The crawl never touches `std::fs` directly. Workers read module sources and
//! the default classifier probes for candidate files through the `Runtime`
//! trait, so tests can swap in an in-memory filesystem.

pub mod native;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// File access used by the crawl.
///
/// Implementations must be shareable across worker tasks, hence the
/// `Send + Sync` bound and the `Arc<dyn Runtime>` usage throughout the crate.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file's full contents.
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Whether `path` exists and is a regular file.
    async fn is_file(&self, path: &Path) -> bool;
}
