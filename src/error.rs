use thiserror::Error;

use crate::{
    dao::storage::StorageError, services::question_source::SourceError,
    state::state_machine::InvalidTransition,
};

/// Errors that can abort a round operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No question could be drawn; the round stays idle.
    #[error("question source failed")]
    Source(#[from] SourceError),
    /// Round or score state could not be persisted; nothing was confirmed to the chat.
    #[error("failed to persist game state")]
    Storage(#[from] StorageError),
    /// Another message held the request gate for too long; this one was dropped.
    #[error("timed out waiting for the request gate")]
    Timeout,
    /// The round was not in a phase that allows the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}
