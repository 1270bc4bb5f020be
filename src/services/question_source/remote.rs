use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{QuestionSource, SourceError};
use crate::state::round::Question;

/// Bounds on how long the remote provider is retried for a usable question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of requests made before giving up.
    pub max_attempts: u32,
    /// Delay before the second request; doubled after every failed attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between two requests.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteClue {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

/// Fetches one random question per round from an HTTP provider.
///
/// The provider answers `GET <endpoint>` with a JSON array whose first element
/// carries `question` and `answer` strings.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl RemoteSource {
    /// Build a source querying `endpoint` with the given per-request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        request_timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(SourceError::Provider)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            retry,
        })
    }

    /// Request a single clue. `Ok(None)` means the provider answered with nothing usable.
    async fn fetch_once(&self) -> Result<Option<Question>, SourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(SourceError::Provider)?;

        let clues = match response.json::<Vec<RemoteClue>>().await {
            Ok(clues) => clues,
            Err(err) => {
                warn!(error = %err, "question provider returned a malformed payload");
                return Ok(None);
            }
        };

        Ok(clues.into_iter().next().and_then(|clue| {
            Question::new(clue.question.unwrap_or_default(), clue.answer.unwrap_or_default())
        }))
    }

    async fn fetch_with_retry(&self) -> Result<Question, SourceError> {
        let attempts = self.retry.max_attempts.max(1);
        let mut delay = self.retry.initial_delay;

        for attempt in 1..=attempts {
            if let Some(question) = self.fetch_once().await? {
                debug!(attempt, "fetched question from provider");
                return Ok(question);
            }

            warn!(attempt, max_attempts = attempts, "provider returned a blank question");
            if attempt < attempts {
                sleep(delay).await;
                delay = (delay * 2).min(self.retry.max_delay);
            }
        }

        Err(SourceError::NoUsableQuestion { attempts })
    }
}

impl QuestionSource for RemoteSource {
    fn next_question(&self) -> BoxFuture<'_, Result<Question, SourceError>> {
        Box::pin(self.fetch_with_retry())
    }
}
