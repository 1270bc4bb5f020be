use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::fs;

use crate::dao::{
    state_store::StateStore,
    storage::{StorageError, StorageResult},
};

/// Stores each document as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStateStore {
    dir: Arc<Path>,
}

impl FileStateStore {
    /// Create a store rooted at `dir`. The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir: PathBuf = dir.into();
        Self {
            dir: Arc::from(dir),
        }
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for FileStateStore {
    fn load(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let path = self.document_path(key);
        let key = key.to_string();
        Box::pin(async move {
            let contents = match fs::read_to_string(&path).await {
                Ok(contents) => contents,
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
                Err(err) => return Err(StorageError::read(&key, err)),
            };

            serde_json::from_str(&contents)
                .map(Some)
                .map_err(|source| StorageError::Decode { key, source })
        })
    }

    fn save(&self, key: &str, document: Value) -> BoxFuture<'static, StorageResult<()>> {
        let dir = self.dir.clone();
        let path = self.document_path(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        let key = key.to_string();
        Box::pin(async move {
            let bytes = serde_json::to_vec(&document).map_err(|err| StorageError::write(&key, err))?;

            fs::create_dir_all(&dir)
                .await
                .map_err(|err| StorageError::write(&key, err))?;
            fs::write(&staging, bytes)
                .await
                .map_err(|err| StorageError::write(&key, err))?;
            // Readers only ever observe the previous or the new document.
            fs::rename(&staging, &path)
                .await
                .map_err(|err| StorageError::write(&key, err))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let dir = self.dir.clone();
        Box::pin(async move {
            fs::create_dir_all(&dir).await.map_err(|err| {
                StorageError::unavailable(format!("state directory {}", dir.display()), err)
            })
        })
    }
}
