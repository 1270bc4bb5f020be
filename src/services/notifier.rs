//! Outbound chat messaging.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

/// Failures raised while posting a chat message.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP client could not be built.
    #[error("failed to build chat API client")]
    Client(#[source] reqwest::Error),
    /// The request could not be sent or did not complete in time.
    #[error("failed to send chat message")]
    Send(#[source] reqwest::Error),
    /// The chat API refused the message.
    #[error("chat API rejected the message with status {0}")]
    Rejected(reqwest::StatusCode),
}

/// Capability to post a text message into the game's chat.
pub trait Notifier: Send + Sync {
    /// Post `text` as the bot.
    fn post_message(&self, text: String) -> BoxFuture<'_, Result<(), NotifyError>>;
}

#[derive(Debug, Serialize)]
struct BotPost<'a> {
    text: &'a str,
    bot_id: &'a str,
}

/// Posts through the GroupMe bots API.
#[derive(Debug, Clone)]
pub struct GroupMeNotifier {
    client: Client,
    api_url: String,
    access_token: String,
    bot_id: String,
}

impl GroupMeNotifier {
    /// Build a notifier posting to `<api_url>/v3/bots/post`, giving up on any
    /// request that takes longer than `request_timeout`.
    pub fn new(
        api_url: impl Into<String>,
        access_token: impl Into<String>,
        bot_id: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(NotifyError::Client)?;
        let api_url: String = api_url.into();
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            bot_id: bot_id.into(),
        })
    }

    async fn post(&self, text: String) -> Result<(), NotifyError> {
        let url = format!("{}/v3/bots/post", self.api_url);
        let response = self
            .client
            .post(url)
            .query(&[("token", self.access_token.as_str())])
            .json(&BotPost {
                text: &text,
                bot_id: &self.bot_id,
            })
            .send()
            .await
            .map_err(NotifyError::Send)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(response.status()))
        }
    }
}

impl Notifier for GroupMeNotifier {
    fn post_message(&self, text: String) -> BoxFuture<'_, Result<(), NotifyError>> {
        Box::pin(self.post(text))
    }
}

/// Development stand-in that prints messages to stdout instead of posting them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn post_message(&self, text: String) -> BoxFuture<'_, Result<(), NotifyError>> {
        Box::pin(async move {
            println!("{text}");
            Ok(())
        })
    }
}
