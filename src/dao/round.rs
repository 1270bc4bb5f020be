use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::{
    dao::{
        models::RoundEntity,
        state_store::StateStore,
        storage::{StorageError, StorageResult},
    },
    state::round::ActiveRound,
};

const ROUND_KEY: &str = "current_question";

/// Data access for the single persisted round slot.
#[derive(Clone)]
pub struct RoundRepository {
    store: Arc<dyn StateStore>,
}

impl RoundRepository {
    /// Build a repository over `store`.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Load the outstanding round.
    ///
    /// A missing or malformed slot means there is no round. An unreachable store
    /// is an error: reading it as idle would let a new question replace a live one.
    pub async fn load(&self) -> StorageResult<Option<ActiveRound>> {
        let document = match self.store.load(ROUND_KEY).await {
            Ok(Some(document)) if !document.is_null() => document,
            Ok(_) => return Ok(None),
            Err(StorageError::Decode { source, .. }) => {
                warn!(key = ROUND_KEY, error = %source, "corrupt round state; treating as idle");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        match serde_json::from_value::<RoundEntity>(document) {
            Ok(entity) => Ok(entity.into_round()),
            Err(err) => {
                warn!(key = ROUND_KEY, error = %err, "malformed round state; treating as idle");
                Ok(None)
            }
        }
    }

    /// Overwrite the slot with `round`, or clear it with `None`.
    pub async fn save(&self, round: Option<&ActiveRound>) -> StorageResult<()> {
        let document = match round {
            Some(round) => serde_json::to_value(RoundEntity::from(round))
                .map_err(|err| StorageError::write(ROUND_KEY, err))?,
            None => Value::Null,
        };
        self.store.save(ROUND_KEY, document).await
    }
}
