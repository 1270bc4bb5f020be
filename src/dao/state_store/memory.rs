use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::dao::{state_store::StateStore, storage::StorageResult};

/// Process-local store. State is lost when the process exits.
#[derive(Clone, Debug, Default)]
pub struct MemoryStateStore {
    documents: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStateStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let documents = self.documents.clone();
        let key = key.to_string();
        Box::pin(async move { Ok(documents.read().await.get(&key).cloned()) })
    }

    fn save(&self, key: &str, document: Value) -> BoxFuture<'static, StorageResult<()>> {
        let documents = self.documents.clone();
        let key = key.to_string();
        Box::pin(async move {
            documents.write().await.insert(key, document);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
