//! Providers of question/answer pairs for new rounds.

mod corpus;
mod remote;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::state::round::Question;

pub use corpus::{CorpusSource, ExhaustionPolicy};
pub use remote::{RemoteSource, RetryPolicy};

/// Failures raised while drawing the next question.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Every question of the corpus has been asked.
    #[error("question corpus exhausted")]
    Exhausted,
    /// The corpus file could not be read or parsed.
    #[error("failed to load question corpus from `{path}`")]
    Corpus {
        /// File that failed to load.
        path: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The remote provider could not be reached or answered with garbage.
    #[error("question provider request failed")]
    Provider(#[source] reqwest::Error),
    /// The remote provider kept returning blank questions.
    #[error("question provider returned no usable question after {attempts} attempts")]
    NoUsableQuestion {
        /// Requests made before giving up.
        attempts: u32,
    },
}

/// Supplies the next question for a round.
pub trait QuestionSource: Send + Sync {
    /// Draw the question for a new round.
    fn next_question(&self) -> BoxFuture<'_, Result<Question, SourceError>>;
}
