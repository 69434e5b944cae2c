//! Local-disk object store: one directory per container under a root path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::error::StorageError;
use super::ObjectStore;

/// Object store backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Creates a store rooted at `root`. Directories are created lazily on write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the configured root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, container: &str, name: &str) -> PathBuf {
        self.root.join(container).join(name)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn fetch(&self, container: &str, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(container, name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::ObjectNotFound {
                container: container.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    async fn store(&self, container: &str, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let dir = self.root.join(container);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let path = dir.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::WriteFailed {
                container: container.to_string(),
                name: name.to_string(),
                message: e.to_string(),
            })?;

        debug!(container, name, bytes = bytes.len(), "stored object");
        Ok(())
    }

    async fn list(&self, container: &str) -> Result<Vec<String>, StorageError> {
        let dir = self.root.join(container);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::ContainerNotFound {
                    container: container.to_string(),
                });
            }
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
        {
            if entry
                .file_type()
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?
                .is_file()
            {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        names.sort();
        Ok(names)
    }
}
