use std::{sync::Mutex, time::Duration};

use time::OffsetDateTime;

/// A question/answer pair handed out by a question source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Text shown to the chat.
    pub prompt: String,
    /// Raw correct answer, only revealed when the round resolves.
    pub answer: String,
}

impl Question {
    /// Build a question, rejecting pairs where either side is blank.
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Option<Self> {
        let prompt = prompt.into();
        let answer = answer.into();
        if prompt.trim().is_empty() || answer.trim().is_empty() {
            return None;
        }
        Some(Self { prompt, answer })
    }
}

/// The single outstanding question together with the moment it was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRound {
    question: Question,
    issued_at: OffsetDateTime,
}

impl ActiveRound {
    /// Open a round. `issued_at` cannot be changed afterwards.
    pub fn new(question: Question, issued_at: OffsetDateTime) -> Self {
        Self {
            question,
            issued_at,
        }
    }

    /// Displayed question text.
    pub fn prompt(&self) -> &str {
        &self.question.prompt
    }

    /// Raw correct answer.
    pub fn answer(&self) -> &str {
        &self.question.answer
    }

    /// When the question was posted.
    pub fn issued_at(&self) -> OffsetDateTime {
        self.issued_at
    }

    /// Whole seconds left to answer, rounded up and never negative.
    ///
    /// A round with zero seconds remaining is expired.
    pub fn seconds_remaining(&self, now: OffsetDateTime, window: Duration) -> u64 {
        let elapsed = (now - self.issued_at).as_seconds_f64();
        let remaining = (window.as_secs_f64() - elapsed).ceil();
        if remaining <= 0.0 { 0 } else { remaining as u64 }
    }

    /// Whether the answer window has closed at `now`.
    pub fn is_expired(&self, now: OffsetDateTime, window: Duration) -> bool {
        self.seconds_remaining(now, window) == 0
    }
}

/// Source of the current time, injected so the answer window can be tested.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl ManualClock {
    /// Start the clock at `start`.
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(30);

    fn round_at(issued_at: OffsetDateTime) -> ActiveRound {
        ActiveRound::new(Question::new("Capital of France?", "Paris").unwrap(), issued_at)
    }

    #[test]
    fn blank_fields_are_not_a_question() {
        assert!(Question::new("", "Paris").is_none());
        assert!(Question::new("Capital of France?", "   ").is_none());
    }

    #[test]
    fn remaining_seconds_round_up() {
        let start = OffsetDateTime::UNIX_EPOCH;
        let round = round_at(start);

        assert_eq!(round.seconds_remaining(start, WINDOW), 30);
        assert_eq!(
            round.seconds_remaining(start + Duration::from_millis(500), WINDOW),
            30
        );
        assert_eq!(
            round.seconds_remaining(start + Duration::from_millis(29_100), WINDOW),
            1
        );
    }

    #[test]
    fn zero_remaining_counts_as_expired() {
        let start = OffsetDateTime::UNIX_EPOCH;
        let round = round_at(start);

        assert!(!round.is_expired(start + Duration::from_millis(29_999), WINDOW));
        assert!(round.is_expired(start + WINDOW, WINDOW));
        assert_eq!(round.seconds_remaining(start + Duration::from_secs(90), WINDOW), 0);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(OffsetDateTime::UNIX_EPOCH);
        clock.advance(Duration::from_secs(31));
        assert_eq!(clock.now(), OffsetDateTime::UNIX_EPOCH + Duration::from_secs(31));
    }
}
