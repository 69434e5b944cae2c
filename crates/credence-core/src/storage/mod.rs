//! Object storage: the blob collaborator holding screenshots and reports.
//!
//! `FsObjectStore` maps containers to directories under a configured root.
//! `MemoryObjectStore` is the in-memory mock used by tests.

pub mod error;
pub mod fs;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::StorageError;
pub use fs::FsObjectStore;
#[cfg(any(test, feature = "mock"))]
pub use mock::MemoryObjectStore;

use async_trait::async_trait;

/// Opaque key-value blob store, addressed by `(container, name)`.
///
/// Implementations must treat objects as immutable-once-written for the
/// pipeline's purposes; `store` overwrites silently.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches the raw bytes of `container/name`.
    async fn fetch(&self, container: &str, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Stores `bytes` at `container/name`, overwriting any existing object.
    async fn store(&self, container: &str, name: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Lists object names in `container`, sorted ascending.
    async fn list(&self, container: &str) -> Result<Vec<String>, StorageError>;
}
