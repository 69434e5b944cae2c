//! In-memory object store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::StorageError;
use super::ObjectStore;

/// In-memory [`ObjectStore`] with optional transient-failure injection.
#[derive(Default)]
pub struct MemoryObjectStore {
    containers: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
    // Number of upcoming operations that fail with a transient I/O error.
    fail_next: AtomicU32,
    // Same, but counted against writes only.
    fail_next_writes: AtomicU32,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates `container/name` with `bytes`.
    pub fn with_object(self, container: &str, name: &str, bytes: &[u8]) -> Self {
        self.containers
            .write()
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), bytes.to_vec());
        self
    }

    /// Makes the next `n` operations fail with a transient I/O error.
    pub fn fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Makes the next `n` writes fail; reads are unaffected.
    pub fn fail_next_writes(&self, n: u32) {
        self.fail_next_writes.store(n, Ordering::SeqCst);
    }

    /// Returns the stored bytes for `container/name`, if any.
    pub fn get(&self, container: &str, name: &str) -> Option<Vec<u8>> {
        self.containers
            .read()
            .get(container)
            .and_then(|c| c.get(name))
            .cloned()
    }

    /// Returns the number of objects in `container`.
    pub fn object_count(&self, container: &str) -> usize {
        self.containers
            .read()
            .get(container)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    fn check_injected_failure(&self) -> Result<(), StorageError> {
        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(StorageError::Io("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn fetch(&self, container: &str, name: &str) -> Result<Vec<u8>, StorageError> {
        self.check_injected_failure()?;
        self.containers
            .read()
            .get(container)
            .and_then(|c| c.get(name))
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound {
                container: container.to_string(),
                name: name.to_string(),
            })
    }

    async fn store(&self, container: &str, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.check_injected_failure()?;
        let pending_writes = self.fail_next_writes.load(Ordering::SeqCst);
        if pending_writes > 0 {
            self.fail_next_writes.store(pending_writes - 1, Ordering::SeqCst);
            return Err(StorageError::WriteFailed {
                container: container.to_string(),
                name: name.to_string(),
                message: "injected write failure".to_string(),
            });
        }
        self.containers
            .write()
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn list(&self, container: &str) -> Result<Vec<String>, StorageError> {
        self.check_injected_failure()?;
        let containers = self.containers.read();
        let container_map =
            containers
                .get(container)
                .ok_or_else(|| StorageError::ContainerNotFound {
                    container: container.to_string(),
                })?;

        let mut names: Vec<String> = container_map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
