use serde::{Deserialize, Serialize};

/// One inbound chat message, as handed to the router. Read-only per
/// dispatch and never retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Raw Slack event type; the router only dispatches `"message"`.
    pub kind: String,
    pub text: String,
    pub channel: String,
    pub event: EventKind,
}

/// How the message reached the bot. Direct mentions get the full reply
/// format regardless of the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DirectMention,
    Mention,
    Ambient,
    DirectMessage,
}

impl IncomingMessage {
    pub fn new(kind: &str, text: &str, channel: &str, event: EventKind) -> Self {
        Self {
            kind: kind.to_string(),
            text: text.to_string(),
            channel: channel.to_string(),
            event,
        }
    }
}
