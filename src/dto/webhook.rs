use serde::Deserialize;
use utoipa::ToSchema;

/// Chat message pushed to the webhook by the chat provider.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct InboundMessage {
    /// Message body as typed by the sender.
    #[serde(default)]
    pub text: String,
    /// Display name of the sender.
    #[serde(default)]
    pub name: String,
    /// Stable identifier of the sender.
    #[serde(default)]
    pub user_id: String,
    /// `user`, `bot`, or `system`; messages from bots are ignored.
    #[serde(default)]
    pub sender_type: Option<String>,
    /// Group the message was posted in.
    #[serde(default)]
    pub group_id: Option<String>,
}

impl InboundMessage {
    /// Whether the message was posted by a bot (including this one).
    pub fn is_from_bot(&self) -> bool {
        self.sender_type.as_deref() == Some("bot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_payload() {
        let message: InboundMessage =
            serde_json::from_str(r#"{"text": "/trivia", "name": "bob", "user_id": "42"}"#)
                .unwrap();
        assert_eq!(message.text, "/trivia");
        assert_eq!(message.user_id, "42");
        assert!(!message.is_from_bot());
    }

    #[test]
    fn ignores_unknown_provider_fields() {
        let message: InboundMessage = serde_json::from_str(
            r#"{"text": "[Q] hi", "sender_type": "bot", "group_id": "7", "avatar_url": null}"#,
        )
        .unwrap();
        assert!(message.is_from_bot());
        assert_eq!(message.group_id.as_deref(), Some("7"));
        assert!(message.name.is_empty());
    }
}
