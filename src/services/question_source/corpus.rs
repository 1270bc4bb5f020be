use std::{fs, path::Path, sync::Mutex};

use futures::future::BoxFuture;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info};

use super::{QuestionSource, SourceError};
use crate::state::round::Question;

/// What to do once every corpus question has been asked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Put every question back and keep drawing.
    #[default]
    Reshuffle,
    /// Refuse to ask further questions.
    Fail,
}

#[derive(Debug, Deserialize)]
struct CorpusRecord {
    #[serde(alias = "Q")]
    question: String,
    #[serde(alias = "A")]
    answer: String,
}

/// Fixed question set loaded once, drawn at random without replacement.
#[derive(Debug)]
pub struct CorpusSource {
    all: Vec<Question>,
    remaining: Mutex<Vec<Question>>,
    policy: ExhaustionPolicy,
}

impl CorpusSource {
    /// Build a source over an in-memory question set.
    pub fn new(questions: Vec<Question>, policy: ExhaustionPolicy) -> Self {
        Self {
            remaining: Mutex::new(questions.clone()),
            all: questions,
            policy,
        }
    }

    /// Load a JSON array of `{"question", "answer"}` records (`Q`/`A` also accepted).
    ///
    /// Records with a blank question or answer are skipped.
    pub fn from_file(path: &Path, policy: ExhaustionPolicy) -> Result<Self, SourceError> {
        let corpus_error = |source: Box<dyn std::error::Error + Send + Sync>| SourceError::Corpus {
            path: path.display().to_string(),
            source,
        };

        let contents = fs::read_to_string(path).map_err(|err| corpus_error(Box::new(err)))?;
        let records: Vec<CorpusRecord> =
            serde_json::from_str(&contents).map_err(|err| corpus_error(Box::new(err)))?;

        let total = records.len();
        let questions = records
            .into_iter()
            .filter_map(|record| Question::new(record.question, record.answer))
            .collect::<Vec<_>>();
        if questions.len() < total {
            debug!(
                skipped = total - questions.len(),
                "skipped blank corpus records"
            );
        }

        info!(path = %path.display(), count = questions.len(), "loaded question corpus");
        Ok(Self::new(questions, policy))
    }

    fn lock_remaining(&self) -> std::sync::MutexGuard<'_, Vec<Question>> {
        self.remaining
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn draw(&self) -> Result<Question, SourceError> {
        let mut remaining = self.lock_remaining();

        if remaining.is_empty() {
            match self.policy {
                ExhaustionPolicy::Reshuffle if !self.all.is_empty() => {
                    info!(count = self.all.len(), "question corpus exhausted; reshuffling");
                    remaining.clone_from(&self.all);
                }
                _ => return Err(SourceError::Exhausted),
            }
        }

        let index = rand::rng().random_range(0..remaining.len());
        Ok(remaining.swap_remove(index))
    }
}

impl QuestionSource for CorpusSource {
    fn next_question(&self) -> BoxFuture<'_, Result<Question, SourceError>> {
        let drawn = self.draw();
        Box::pin(async move { drawn })
    }
}
