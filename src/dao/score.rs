use std::sync::Arc;

use tracing::warn;

use crate::dao::{
    models::ScoreSheet,
    state_store::StateStore,
    storage::{StorageError, StorageResult},
};

const SCORES_KEY: &str = "user_points";

/// Durable mapping from user identity to accumulated points.
///
/// The whole sheet is read before every operation and written back whole after
/// every mutation.
#[derive(Clone)]
pub struct ScoreRepository {
    store: Arc<dyn StateStore>,
}

impl ScoreRepository {
    /// Build a repository over `store`.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Load the score sheet.
    ///
    /// A missing or malformed sheet reads as empty. An unreachable store is an
    /// error, so a mutation never writes back a sheet it failed to read.
    pub async fn load(&self) -> StorageResult<ScoreSheet> {
        let document = match self.store.load(SCORES_KEY).await {
            Ok(Some(document)) if !document.is_null() => document,
            Ok(_) => return Ok(ScoreSheet::default()),
            Err(StorageError::Decode { source, .. }) => {
                warn!(key = SCORES_KEY, error = %source, "corrupt score sheet; starting empty");
                return Ok(ScoreSheet::default());
            }
            Err(err) => return Err(err),
        };

        Ok(serde_json::from_value(document).unwrap_or_else(|err| {
            warn!(key = SCORES_KEY, error = %err, "malformed score sheet; starting empty");
            ScoreSheet::default()
        }))
    }

    /// Points for `user_id`; zero for unknown users or when the sheet cannot be read.
    pub async fn points_for(&self, user_id: &str) -> u64 {
        match self.load().await {
            Ok(sheet) => sheet.points_for(user_id),
            Err(err) => {
                warn!(key = SCORES_KEY, error = %err, "failed to read score sheet; reporting zero");
                0
            }
        }
    }

    /// Add `amount` points to `user_id`, persist, and return the new total.
    pub async fn add_points(&self, user_id: &str, amount: u64) -> StorageResult<u64> {
        let mut sheet = self.load().await?;
        let total = sheet.add_points(user_id, amount);
        let document =
            serde_json::to_value(&sheet).map_err(|err| StorageError::write(SCORES_KEY, err))?;
        self.store.save(SCORES_KEY, document).await?;
        Ok(total)
    }
}
