//! Object store module
//!
//! Durable key-value byte storage for original photos and cropped face
//! images. Two backends:
//! - **Filesystem** (production): objects under a root directory, keys as
//!   relative paths within the `photos/` and `faces/` namespaces.
//! - **In-memory** (development and tests): objects in a concurrent map.
//!
//! The interface is deliberately narrow (`get`, `put`, `exists`) because
//! the store is an external collaborator, not part of the core's state.

mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use facedex_core::Result;

/// Narrow byte-storage interface consumed by the workers and the gateway.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's bytes. Missing keys are `NotFound`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Write an object durably. The indexing worker relies on `put`
    /// completing before it inserts the Face row.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Whether an object exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool>;
}
