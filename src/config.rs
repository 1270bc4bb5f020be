//! Application configuration: chat credentials from the environment, game tuning from JSON.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::services::question_source::{ExhaustionPolicy, RetryPolicy};

/// Default location on disk where the server looks for the JSON game settings.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_CONFIG_PATH";
const DEFAULT_API_URL: &str = "https://api.groupme.com";
const DEFAULT_REMOTE_ENDPOINT: &str = "http://jservice.io/api/random";

/// Failures that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("{var} must be set")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// An environment variable holds an unsupported value.
    #[error("invalid value `{value}` for {var}")]
    InvalidValue {
        /// Name of the variable.
        var: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Whether chat messages are really posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Messages are printed to the console.
    #[default]
    Development,
    /// Messages are posted to the chat API.
    Production,
}

/// Credentials for the outbound chat API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCredentials {
    /// Token authorizing bot posts.
    pub access_token: String,
    /// Group the bot plays in; messages from other groups are ignored.
    pub group_id: String,
    /// Bot posting the game messages.
    pub bot_id: String,
    /// Base URL of the chat API.
    pub api_url: String,
}

/// Settings for a fixed question corpus.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// JSON file holding the question records.
    pub path: PathBuf,
    /// What to do once every question has been asked.
    pub on_exhausted: ExhaustionPolicy,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("questions.json"),
            on_exhausted: ExhaustionPolicy::default(),
        }
    }
}

/// Settings for a remote random-question provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// URL answering with a random clue.
    pub endpoint: String,
    /// Requests made before giving up on a usable clue.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub retry_delay_ms: u64,
    /// Cap on the doubled retry delay.
    pub max_retry_delay_ms: u64,
    /// Per-request timeout.
    pub request_timeout_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            endpoint: DEFAULT_REMOTE_ENDPOINT.to_string(),
            max_attempts: retry.max_attempts,
            retry_delay_ms: retry.initial_delay.as_millis() as u64,
            max_retry_delay_ms: retry.max_delay.as_millis() as u64,
            request_timeout_ms: 5_000,
        }
    }
}

impl RemoteSettings {
    /// Retry bounds derived from these settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.retry_delay_ms),
            max_delay: Duration::from_millis(self.max_retry_delay_ms),
        }
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Where questions come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSourceSettings {
    /// A fixed question file.
    Corpus(CorpusSettings),
    /// A random-question HTTP provider.
    Remote(RemoteSettings),
}

impl Default for QuestionSourceSettings {
    fn default() -> Self {
        QuestionSourceSettings::Corpus(CorpusSettings::default())
    }
}

/// Where round and score state is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageSettings {
    /// JSON files in `dir`.
    File {
        /// Directory holding one JSON file per document.
        #[serde(default = "default_state_dir")]
        dir: PathBuf,
    },
    /// Process memory only.
    Memory {},
    /// CouchDB, configured through `COUCH_*` environment variables.
    Couch {},
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings::File {
            dir: default_state_dir(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Game tuning read from the JSON settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Seconds players have to answer a question.
    pub answer_window_secs: u64,
    /// Where questions are drawn from.
    pub question_source: QuestionSourceSettings,
    /// Where round and score state is kept.
    pub storage: StorageSettings,
    /// Per-request timeout of the chat API client.
    pub chat_timeout_ms: u64,
    /// How long a message waits for the one in flight before it is dropped.
    pub request_gate_timeout_ms: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            answer_window_secs: 30,
            question_source: QuestionSourceSettings::default(),
            storage: StorageSettings::default(),
            chat_timeout_ms: 5_000,
            request_gate_timeout_ms: 30_000,
        }
    }
}

impl GameSettings {
    /// Load the settings file, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(settings) => {
                    info!(
                        path = %path.display(),
                        answer_window_secs = settings.answer_window_secs,
                        "loaded game settings"
                    );
                    settings
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Length of the answer window.
    pub fn answer_window(&self) -> Duration {
        Duration::from_secs(self.answer_window_secs.max(1))
    }

    /// Timeout applied to every chat API request.
    pub fn chat_timeout(&self) -> Duration {
        Duration::from_millis(self.chat_timeout_ms.max(1))
    }

    /// Upper bound on waiting for the request gate.
    pub fn request_gate_timeout(&self) -> Duration {
        Duration::from_millis(self.request_gate_timeout_ms.max(1))
    }
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Chat API credentials.
    pub chat: ChatCredentials,
    /// Whether messages are really posted.
    pub mode: ExecutionMode,
    /// Game tuning.
    pub game: GameSettings,
}

impl AppConfig {
    /// Read credentials from the process environment and game settings from disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok(), GameSettings::load())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars(
        lookup: impl Fn(&str) -> Option<String>,
        game: GameSettings,
    ) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingEnvVar { var })
        };

        let chat = ChatCredentials {
            access_token: required("GROUPME_ACCESS_TOKEN")?,
            group_id: required("GROUPME_GROUP_ID")?,
            bot_id: required("GROUPME_BOT_ID")?,
            api_url: lookup("GROUPME_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        };

        let mode = match lookup("APP_ENV").as_deref().map(str::trim) {
            None | Some("") | Some("development") => ExecutionMode::Development,
            Some("production") => ExecutionMode::Production,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    var: "APP_ENV",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self { chat, mode, game })
    }

    /// Identifier of the group the bot plays in.
    pub fn group_id(&self) -> &str {
        &self.chat.group_id
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
