use async_trait::async_trait;

use crate::domain::message::IncomingMessage;
use crate::domain::reply::ReplyPayload;
use crate::error::AppResult;

/// Sends a reply back into the channel the message came from.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn reply(&self, message: &IncomingMessage, payload: &ReplyPayload) -> AppResult<()>;
}
