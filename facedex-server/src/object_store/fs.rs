//! Filesystem-backed object store.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use facedex_core::{FacedexError, Result};
use tracing::debug;

use super::ObjectStore;

/// Object store rooted at a directory; keys map to relative paths.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to a path under the root, rejecting anything that
    /// would escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative.components().any(|c| {
            !matches!(c, Component::Normal(_))
        });
        if key.is_empty() || escapes {
            return Err(FacedexError::InvalidInput(format!(
                "key {key:?} is not a valid object path"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FacedexError::NotFound(format!("object {key}")))
            }
            Err(e) => Err(FacedexError::Unavailable(format!(
                "object store read {key}: {e}"
            ))),
        }
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FacedexError::Unavailable(format!("object store mkdir for {key}: {e}"))
            })?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| FacedexError::Unavailable(format!("object store write {key}: {e}")))?;
        debug!(key, size = bytes.len(), "object written");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }
}
