use std::{sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use crate::{
    dao::{round::RoundRepository, score::ScoreRepository},
    error::ServiceError,
    services::{
        normalizer::{answers_match, normalize},
        notifier::Notifier,
        question_source::QuestionSource,
    },
    state::{
        round::{ActiveRound, Clock},
        state_machine::{RoundEvent, RoundStateMachine},
    },
};

/// Points awarded for a correct answer.
const POINTS_PER_ANSWER: u64 = 1;

/// Result of [`TriviaRound::check_and_expire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundCheck {
    /// A question is outstanding and its window is still open.
    pub active: bool,
    /// This check closed an expired round and posted the timeout message.
    pub expired: bool,
}

/// What happened to a submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The answer matched; the round is over.
    Correct {
        /// The user's total after the award.
        total_points: u64,
    },
    /// The answer did not match; the round goes on.
    Incorrect {
        /// Whole seconds left in the window.
        seconds_left: u64,
    },
    /// The window had already closed; the answer was revealed and nothing was scored.
    Expired,
    /// There was no question to answer.
    NoActiveRound,
}

/// Lifecycle of the single outstanding trivia question.
///
/// Holds no round state of its own: every operation reloads the persisted round,
/// applies one transition, and writes the result back before anything is posted
/// to the chat. A failed write aborts the operation without a confirmation.
pub struct TriviaRound {
    rounds: RoundRepository,
    scores: ScoreRepository,
    source: Arc<dyn QuestionSource>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl TriviaRound {
    /// Wire the round lifecycle onto its repositories and collaborators.
    pub fn new(
        rounds: RoundRepository,
        scores: ScoreRepository,
        source: Arc<dyn QuestionSource>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        window: Duration,
    ) -> Self {
        Self {
            rounds,
            scores,
            source,
            notifier,
            clock,
            window,
        }
    }


    /// Draw a question, open a round for it, and post the prompt.
    ///
    /// Replaces any outstanding round. On a source failure the stored round is
    /// left untouched.
    pub async fn ask_question(&self) -> Result<ActiveRound, ServiceError> {
        let mut sm = self.restore().await?;
        let question = self.source.next_question().await?;
        let round = ActiveRound::new(question, self.clock.now());

        sm.apply(RoundEvent::QuestionAsked(round.clone()))?;
        self.rounds.save(sm.active_round()).await?;
        info!(prompt = round.prompt(), "question asked");

        self.notify(format!(
            "[Q] {}\n({}s to answer)",
            round.prompt(),
            self.window.as_secs()
        ))
        .await;
        Ok(round)
    }

    /// Report whether a question is live, closing it first if its window has run out.
    ///
    /// Closing a round posts the timeout message and persists the idle state, so
    /// this is not a pure query.
    pub async fn check_and_expire(&self) -> Result<RoundCheck, ServiceError> {
        let mut sm = self.restore().await?;
        let Some(round) = sm.active_round().cloned() else {
            return Ok(RoundCheck {
                active: false,
                expired: false,
            });
        };

        if !round.is_expired(self.clock.now(), self.window) {
            return Ok(RoundCheck {
                active: true,
                expired: false,
            });
        }

        self.expire(&mut sm, &round).await?;
        Ok(RoundCheck {
            active: false,
            expired: true,
        })
    }

    /// Judge `attempt` from `user_id` against the outstanding question.
    pub async fn submit_answer(
        &self,
        user_id: &str,
        username: &str,
        attempt: &str,
    ) -> Result<AnswerOutcome, ServiceError> {
        let mut sm = self.restore().await?;
        let Some(round) = sm.active_round().cloned() else {
            debug!(user_id, "answer submitted without an active round");
            return Ok(AnswerOutcome::NoActiveRound);
        };

        let seconds_left = round.seconds_remaining(self.clock.now(), self.window);
        if seconds_left == 0 {
            self.expire(&mut sm, &round).await?;
            return Ok(AnswerOutcome::Expired);
        }

        if !answers_match(round.answer(), attempt) {
            let points = self.scores.points_for(user_id).await;
            info!(user_id, seconds_left, "incorrect answer");
            self.notify(format!(
                "[A: {username} ({points}p)] Nope, \"{}\" is wrong. {seconds_left}s left to answer...",
                normalize(attempt)
            ))
            .await;
            return Ok(AnswerOutcome::Incorrect { seconds_left });
        }

        // Close the round before awarding so a failed award can never be repeated.
        sm.apply(RoundEvent::AnsweredCorrectly)?;
        self.rounds.save(sm.active_round()).await?;
        let total_points = self.scores.add_points(user_id, POINTS_PER_ANSWER).await?;
        info!(user_id, total_points, "correct answer");

        self.notify(format!(
            "[A: {username} ({total_points}p)] Yes, {}",
            round.answer()
        ))
        .await;
        Ok(AnswerOutcome::Correct { total_points })
    }

    async fn restore(&self) -> Result<RoundStateMachine, ServiceError> {
        Ok(RoundStateMachine::restore(self.rounds.load().await?))
    }

    async fn expire(
        &self,
        sm: &mut RoundStateMachine,
        round: &ActiveRound,
    ) -> Result<(), ServiceError> {
        sm.apply(RoundEvent::TimerExpired)?;
        self.rounds.save(sm.active_round()).await?;
        info!(prompt = round.prompt(), "round timed out");

        self.notify(format!(
            "[x] Timer ran out, answer was \"{}\"",
            round.answer()
        ))
        .await;
        Ok(())
    }

    /// Best-effort delivery: failures are logged, never retried or propagated.
    async fn notify(&self, text: String) {
        if let Err(err) = self.notifier.post_message(text).await {
            warn!(error = %err, "failed to post chat message");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::future::BoxFuture;
    use serde_json::Value;
    use time::OffsetDateTime;

    use super::*;
    use crate::{
        dao::{
            state_store::{MemoryStateStore, StateStore, flaky::FlakyStore},
            storage::{StorageError, StorageResult},
        },
        services::{
            notifier::NotifyError,
            question_source::{CorpusSource, ExhaustionPolicy},
        },
        state::round::{ManualClock, Question},
    };

    const WINDOW: Duration = Duration::from_secs(30);

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn post_message(&self, text: String) -> BoxFuture<'_, Result<(), NotifyError>> {
            self.sent.lock().unwrap().push(text);
            Box::pin(async { Ok(()) })
        }
    }

    /// Reads like an empty store and refuses every write.
    struct ReadOnlyStore;

    impl StateStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
            Box::pin(async { Ok(None) })
        }

        fn save(&self, key: &str, _document: Value) -> BoxFuture<'static, StorageResult<()>> {
            let err = StorageError::write(key, std::io::Error::other("read-only"));
            Box::pin(async move { Err(err) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    struct Harness {
        round: TriviaRound,
        store: Arc<dyn StateStore>,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<ManualClock>,
    }

    impl Harness {
        fn new(questions: &[(&str, &str)]) -> Self {
            Self::with_store(questions, Arc::new(MemoryStateStore::new()))
        }

        fn with_store(questions: &[(&str, &str)], store: Arc<dyn StateStore>) -> Self {
            let questions = questions
                .iter()
                .map(|(q, a)| Question::new(*q, *a).unwrap())
                .collect();
            let notifier = Arc::new(RecordingNotifier::default());
            let clock = Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH));
            let round = TriviaRound::new(
                RoundRepository::new(store.clone()),
                ScoreRepository::new(store.clone()),
                Arc::new(CorpusSource::new(questions, ExhaustionPolicy::Fail)),
                notifier.clone(),
                clock.clone(),
                WINDOW,
            );
            Self {
                round,
                store,
                notifier,
                clock,
            }
        }

        /// A second handler over the same persisted state, as a fresh invocation would see it.
        fn reopen(&self) -> TriviaRound {
            TriviaRound::new(
                RoundRepository::new(self.store.clone()),
                ScoreRepository::new(self.store.clone()),
                Arc::new(CorpusSource::new(Vec::new(), ExhaustionPolicy::Fail)),
                self.notifier.clone(),
                self.clock.clone(),
                WINDOW,
            )
        }
    }

    #[tokio::test]
    async fn asking_opens_a_round_and_posts_the_prompt() {
        let h = Harness::new(&[("Capital of France?", "Paris")]);

        let round = h.round.ask_question().await.unwrap();
        assert_eq!(round.prompt(), "Capital of France?");
        assert_eq!(round.issued_at(), OffsetDateTime::UNIX_EPOCH);

        let check = h.round.check_and_expire().await.unwrap();
        assert_eq!(
            check,
            RoundCheck {
                active: true,
                expired: false
            }
        );
        assert_eq!(
            h.notifier.sent(),
            vec!["[Q] Capital of France?\n(30s to answer)".to_string()]
        );
    }

    #[tokio::test]
    async fn source_failure_leaves_the_round_idle() {
        let h = Harness::new(&[]);

        let err = h.round.ask_question().await.unwrap_err();
        assert!(matches!(err, ServiceError::Source(_)));
        assert!(!h.round.check_and_expire().await.unwrap().active);
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn timeout_fires_exactly_once() {
        let h = Harness::new(&[("Capital of France?", "Paris")]);
        h.round.ask_question().await.unwrap();

        h.clock.advance(WINDOW);
        let first = h.round.check_and_expire().await.unwrap();
        let second = h.round.check_and_expire().await.unwrap();

        assert_eq!(
            first,
            RoundCheck {
                active: false,
                expired: true
            }
        );
        assert_eq!(
            second,
            RoundCheck {
                active: false,
                expired: false
            }
        );
        let timeouts = h
            .notifier
            .sent()
            .into_iter()
            .filter(|text| text.starts_with("[x]"))
            .collect::<Vec<_>>();
        assert_eq!(timeouts, vec!["[x] Timer ran out, answer was \"Paris\"".to_string()]);
    }

    #[tokio::test]
    async fn correct_answer_scores_once_and_clears_the_round() {
        let h = Harness::new(&[("Capital of France?", "Paris")]);
        h.round.ask_question().await.unwrap();

        let outcome = h.round.submit_answer("u1", "bob", "paris").await.unwrap();
        assert_eq!(outcome, AnswerOutcome::Correct { total_points: 1 });
        assert_eq!(h.round.scores.points_for("u1").await, 1);
        assert!(!h.round.check_and_expire().await.unwrap().active);
        assert_eq!(
            h.notifier.sent().last().map(String::as_str),
            Some("[A: bob (1p)] Yes, Paris")
        );

        let again = h.round.submit_answer("u1", "bob", "paris").await.unwrap();
        assert_eq!(again, AnswerOutcome::NoActiveRound);
        assert_eq!(h.round.scores.points_for("u1").await, 1);
    }

    #[tokio::test]
    async fn incorrect_answer_keeps_the_round_unchanged() {
        let h = Harness::new(&[("Capital of France?", "Paris")]);
        let asked = h.round.ask_question().await.unwrap();

        h.clock.advance(Duration::from_millis(12_400));
        let outcome = h.round.submit_answer("u1", "bob", "The London!").await.unwrap();

        assert_eq!(outcome, AnswerOutcome::Incorrect { seconds_left: 18 });
        assert_eq!(h.round.scores.points_for("u1").await, 0);
        assert_eq!(
            h.notifier.sent().last().map(String::as_str),
            Some("[A: bob (0p)] Nope, \"london\" is wrong. 18s left to answer...")
        );

        let reloaded = h.round.rounds.load().await.unwrap().unwrap();
        assert_eq!(reloaded, asked);
    }

    #[tokio::test]
    async fn late_answer_reveals_instead_of_scoring() {
        let h = Harness::new(&[("Capital of France?", "Paris")]);
        h.round.ask_question().await.unwrap();

        h.clock.advance(Duration::from_secs(45));
        let outcome = h.round.submit_answer("u1", "bob", "paris").await.unwrap();

        assert_eq!(outcome, AnswerOutcome::Expired);
        assert_eq!(h.round.scores.points_for("u1").await, 0);
        assert_eq!(
            h.notifier.sent().last().map(String::as_str),
            Some("[x] Timer ran out, answer was \"Paris\"")
        );
    }

    #[tokio::test]
    async fn round_state_is_shared_across_invocations() {
        let h = Harness::new(&[("Capital of France?", "Paris")]);
        h.round.ask_question().await.unwrap();

        let fresh = h.reopen();
        let outcome = fresh.submit_answer("u7", "ann", "PARIS").await.unwrap();
        assert_eq!(outcome, AnswerOutcome::Correct { total_points: 1 });
        assert!(!h.round.check_and_expire().await.unwrap().active);
    }

    #[tokio::test]
    async fn failed_write_aborts_without_posting() {
        let h = Harness::with_store(&[("Capital of France?", "Paris")], Arc::new(ReadOnlyStore));

        let err = h.round.ask_question().await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn unreadable_round_blocks_a_new_question() {
        let inner = MemoryStateStore::new();
        let store = Arc::new(FlakyStore::new(inner));
        let h = Harness::with_store(
            &[("Capital of France?", "Paris"), ("Capital of Spain?", "Madrid")],
            store.clone(),
        );
        let asked = h.round.ask_question().await.unwrap();

        store.fail_next_loads(1);
        let err = h.round.ask_question().await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));

        assert_eq!(h.round.rounds.load().await.unwrap(), Some(asked));
        assert_eq!(h.notifier.sent().len(), 1);
    }
}
