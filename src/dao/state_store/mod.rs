/// CouchDB backend.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// One JSON file per key.
pub mod file;
#[cfg(test)]
pub(crate) mod flaky;
/// Process-local backend.
pub mod memory;

use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use serde_json::Value;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

/// Abstraction over the durable key-value slot holding whole JSON documents.
///
/// Every document is read and written whole: `save` replaces whatever was stored
/// under the key, and `load` returns `None` when nothing was ever stored.
pub trait StateStore: Send + Sync {
    /// Fetch the document stored under `key`.
    fn load(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>>;
    /// Replace the document stored under `key`.
    fn save(&self, key: &str, document: Value) -> BoxFuture<'static, StorageResult<()>>;
    /// Check that the backend is reachable and writable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
