//! Store wrapper whose reads can be made to fail on demand.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use serde_json::Value;

use crate::dao::{
    state_store::{MemoryStateStore, StateStore},
    storage::{StorageError, StorageResult},
};

pub(crate) struct FlakyStore {
    inner: MemoryStateStore,
    failing_loads: AtomicUsize,
}

impl FlakyStore {
    pub(crate) fn new(inner: MemoryStateStore) -> Self {
        Self {
            inner,
            failing_loads: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` loads report the store as unreachable.
    pub(crate) fn fail_next_loads(&self, count: usize) {
        self.failing_loads.store(count, Ordering::SeqCst);
    }
}

impl StateStore for FlakyStore {
    fn load(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let fail = self
            .failing_loads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            let err = StorageError::unavailable(
                "store offline".into(),
                std::io::Error::other("connection reset"),
            );
            return Box::pin(async move { Err(err) });
        }
        self.inner.load(key)
    }

    fn save(&self, key: &str, document: Value) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.save(key, document)
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }
}
