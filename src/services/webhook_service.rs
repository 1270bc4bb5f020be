use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::{
    dto::webhook::InboundMessage,
    error::ServiceError,
    services::trivia_service::AnswerOutcome,
    state::SharedState,
};

static START_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*[\\/]trivia\s*$").expect("valid start pattern"));
static ANSWER_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*[\\/](?:a|answer)\s+(\S.*?)\s*$").expect("valid answer pattern")
});

/// Chat commands understood by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/trivia` (or `\trivia`): ask a new question.
    StartRound,
    /// `/a <answer>`, `/answer <answer>` (or backslash forms): answer the current question.
    Answer(String),
}

impl Command {
    /// Match a message body against the command patterns.
    pub fn parse(text: &str) -> Option<Self> {
        if START_COMMAND.is_match(text) {
            return Some(Command::StartRound);
        }
        ANSWER_COMMAND
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|attempt| Command::Answer(attempt.as_str().to_string()))
    }
}

/// What the webhook did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The message came from a bot or another group.
    Ignored,
    /// A new question was asked.
    QuestionAsked,
    /// An answer was judged.
    Answered(AnswerOutcome),
    /// Nothing matched in the current round phase.
    NoOp,
}

/// Route one inbound chat message to the trivia round.
///
/// Calls are serialized through the request gate so the read-modify-write
/// cycles on round and score state never interleave within this process.
pub async fn handle_message(
    state: &SharedState,
    message: InboundMessage,
) -> Result<Dispatch, ServiceError> {
    if message.is_from_bot() {
        debug!(name = %message.name, "ignoring bot message");
        return Ok(Dispatch::Ignored);
    }
    if let Some(group_id) = message.group_id.as_deref() {
        if group_id != state.config().group_id() {
            debug!(group_id, "ignoring message from another group");
            return Ok(Dispatch::Ignored);
        }
    }

    let _gate = state.acquire_request_gate().await?;
    let trivia = state.trivia();
    let check = trivia.check_and_expire().await?;

    match (Command::parse(&message.text), check.active) {
        (Some(Command::StartRound), false) => {
            info!(user_id = %message.user_id, "starting a round");
            trivia.ask_question().await?;
            Ok(Dispatch::QuestionAsked)
        }
        (Some(Command::Answer(attempt)), true) => {
            let outcome = trivia
                .submit_answer(&message.user_id, &message.name, &attempt)
                .await?;
            Ok(Dispatch::Answered(outcome))
        }
        (_, true) => {
            debug!("question still active");
            Ok(Dispatch::NoOp)
        }
        (_, false) => {
            debug!("nothing to do");
            Ok(Dispatch::NoOp)
        }
    }
}
