//! Native filesystem runtime.
//!
//! Blocking `std::fs` calls run on tokio's blocking pool so that a slow disk
//! never stalls the coordinator or other workers.

// NativeRuntime is the one place allowed to touch std::fs
#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use std::path::Path;
use tokio::task;

use super::{Runtime, RuntimeError, RuntimeResult};

/// `Runtime` backed by the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

fn map_io(path: &Path, err: std::io::Error, action: &str) -> RuntimeError {
    if err.kind() == std::io::ErrorKind::NotFound {
        RuntimeError::FileNotFound(path.to_path_buf())
    } else {
        RuntimeError::Io(format!("Failed to {action} {}: {err}", path.display()))
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = path.to_path_buf();

        task::spawn_blocking(move || std::fs::read(&path).map_err(|e| map_io(&path, e, "read")))
            .await
            .map_err(|e| RuntimeError::Other(format!("Task join error: {e}")))?
    }

    async fn is_file(&self, path: &Path) -> bool {
        let path = path.to_path_buf();

        task::spawn_blocking(move || std::fs::metadata(&path).is_ok_and(|meta| meta.is_file()))
            .await
            .unwrap_or(false)
    }
}
