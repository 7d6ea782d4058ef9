use std::sync::Arc;

use crate::domain::message::IncomingMessage;
use crate::domain::reply::{Reply, ReplyPayload};
use crate::services::ChatTransport;

/// Reply channel bound to one inbound message. A send failure is logged
/// and swallowed: the command's outcome was decided before this point.
pub struct Talker {
    transport: Arc<dyn ChatTransport>,
    message: IncomingMessage,
}

impl Talker {
    pub fn new(transport: Arc<dyn ChatTransport>, message: IncomingMessage) -> Self {
        Self { transport, message }
    }

    pub async fn say_text(&self, text: impl Into<String>) {
        self.send(ReplyPayload::from_text(text)).await;
    }

    pub async fn say_attachment(&self, reply: Reply) {
        self.send(ReplyPayload::from_attachment(reply)).await;
    }

    async fn send(&self, payload: ReplyPayload) {
        if let Err(err) = self.transport.reply(&self.message, &payload).await {
            tracing::warn!(channel = %self.message.channel, "could not respond: {err}");
        }
    }
}
