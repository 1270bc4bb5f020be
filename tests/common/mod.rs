#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::future::BoxFuture;
use time::OffsetDateTime;
use trivia_bot::{
    config::{AppConfig, GameSettings},
    dao::state_store::{MemoryStateStore, StateStore},
    services::{
        notifier::{Notifier, NotifyError},
        question_source::{CorpusSource, ExhaustionPolicy},
    },
    state::{
        AppState, SharedState,
        round::{ManualClock, Question},
    },
};

pub const GROUP_ID: &str = "group-1";

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn post_message(&self, text: String) -> BoxFuture<'_, Result<(), NotifyError>> {
        self.sent.lock().unwrap().push(text);
        Box::pin(async { Ok(()) })
    }
}

pub struct TestApp {
    pub state: SharedState,
    pub store: Arc<dyn StateStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// App over an in-memory store whose corpus holds only the Paris question.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStateStore::new()))
    }

    pub fn with_store(store: Arc<dyn StateStore>) -> Self {
        Self::with_settings(store, GameSettings::default())
    }

    pub fn with_settings(store: Arc<dyn StateStore>, game: GameSettings) -> Self {
        let config = AppConfig::from_vars(
            |name| match name {
                "GROUPME_ACCESS_TOKEN" => Some("token".into()),
                "GROUPME_GROUP_ID" => Some(GROUP_ID.into()),
                "GROUPME_BOT_ID" => Some("bot".into()),
                _ => None,
            },
            game,
        )
        .unwrap();
        let source = CorpusSource::new(
            vec![Question::new("Capital of France?", "Paris").unwrap()],
            ExhaustionPolicy::Reshuffle,
        );
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH));
        let state = AppState::new(
            config,
            store.clone(),
            Arc::new(source),
            notifier.clone(),
            clock.clone(),
        );
        Self {
            state,
            store,
            notifier,
            clock,
        }
    }

    pub fn advance(&self, secs: u64) {
        self.clock.advance(Duration::from_secs(secs));
    }
}
