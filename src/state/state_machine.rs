use thiserror::Error;

use crate::state::round::ActiveRound;

/// Phases a trivia round can be in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoundPhase {
    /// No question is outstanding.
    #[default]
    Idle,
    /// A question has been posted and awaits answers.
    Active(ActiveRound),
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    /// A new question was posted. From `Active` this replaces the outstanding round.
    QuestionAsked(ActiveRound),
    /// Someone matched the answer.
    AnsweredCorrectly,
    /// The answer window closed without a correct answer.
    TimerExpired,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: RoundPhase,
    /// The event that cannot be applied from this phase.
    pub event: RoundEvent,
}

/// State machine for the lifecycle of the single outstanding question.
///
/// It is rebuilt from persisted state at the start of every request, so it
/// carries no history beyond the current phase.
#[derive(Debug, Clone, Default)]
pub struct RoundStateMachine {
    phase: RoundPhase,
}

impl RoundStateMachine {
    /// Restore the state machine from the persisted round, if any.
    pub fn restore(round: Option<ActiveRound>) -> Self {
        Self {
            phase: round.map_or(RoundPhase::Idle, RoundPhase::Active),
        }
    }

    /// The outstanding round, if any.
    pub fn active_round(&self) -> Option<&ActiveRound> {
        match &self.phase {
            RoundPhase::Active(round) => Some(round),
            RoundPhase::Idle => None,
        }
    }

    /// Apply an event, moving the state machine to the next phase.
    pub fn apply(&mut self, event: RoundEvent) -> Result<&RoundPhase, InvalidTransition> {
        self.phase = self.compute_transition(event)?;
        Ok(&self.phase)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: RoundEvent) -> Result<RoundPhase, InvalidTransition> {
        let next = match (&self.phase, event) {
            (_, RoundEvent::QuestionAsked(round)) => RoundPhase::Active(round),
            (RoundPhase::Active(_), RoundEvent::AnsweredCorrectly) => RoundPhase::Idle,
            (RoundPhase::Active(_), RoundEvent::TimerExpired) => RoundPhase::Idle,
            (from, event) => {
                return Err(InvalidTransition {
                    from: from.clone(),
                    event,
                });
            }
        };

        Ok(next)
    }
}
