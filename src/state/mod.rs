/// Questions, rounds, and time.
pub mod round;
/// Round phase transitions.
pub mod state_machine;

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, MutexGuard},
    time::timeout,
};

use crate::{
    config::AppConfig,
    error::ServiceError,
    dao::{round::RoundRepository, score::ScoreRepository, state_store::StateStore},
    services::{
        notifier::Notifier, question_source::QuestionSource, trivia_service::TriviaRound,
    },
    state::round::Clock,
};

/// Handle shared by every request handler.
pub type SharedState = Arc<AppState>;

/// Central application state shared by every request handler.
///
/// Round and score state live in the [`StateStore`], not here: each request
/// reloads them, so a fresh process resumes the game where the last one left it.
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn StateStore>,
    trivia: TriviaRound,
    request_gate: Mutex<()>,
    gate_timeout: Duration,
}

impl AppState {
    /// Wire the round service onto its collaborators and wrap the state in an [`Arc`].
    pub fn new(
        config: AppConfig,
        store: Arc<dyn StateStore>,
        source: Arc<dyn QuestionSource>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> SharedState {
        let trivia = TriviaRound::new(
            RoundRepository::new(store.clone()),
            ScoreRepository::new(store.clone()),
            source,
            notifier,
            clock,
            config.game.answer_window(),
        );
        let gate_timeout = config.game.request_gate_timeout();
        Arc::new(Self {
            config,
            store,
            trivia,
            request_gate: Mutex::new(()),
            gate_timeout,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Backing store for round and score documents.
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// The trivia round service.
    pub fn trivia(&self) -> &TriviaRound {
        &self.trivia
    }

    /// Take the lock held for the whole handling of one inbound message.
    ///
    /// Fails with [`ServiceError::Timeout`] when the message in flight keeps it
    /// longer than the configured gate timeout.
    pub async fn acquire_request_gate(&self) -> Result<MutexGuard<'_, ()>, ServiceError> {
        timeout(self.gate_timeout, self.request_gate.lock())
            .await
            .map_err(|_| ServiceError::Timeout)
    }
}
