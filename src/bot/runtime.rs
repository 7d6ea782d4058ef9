use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use crate::bot::router::Router;
use crate::domain::message::{EventKind, IncomingMessage};
use crate::error::{AppError, AppResult};
use crate::infra::slack::SlackClient;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Socket-mode event loop: opens the websocket, acks envelopes, maps
/// Slack events onto `IncomingMessage` and hands them to the router.
pub struct BotRuntime {
    slack: Arc<SlackClient>,
    router: Router,
    auto_reconnect: bool,
}

#[derive(Deserialize)]
struct SocketEnvelope {
    #[serde(rename = "type")]
    envelope_type: String,
    #[serde(default)]
    envelope_id: Option<String>,
    #[serde(default)]
    payload: Value,
}

impl BotRuntime {
    pub fn new(slack: Arc<SlackClient>, router: Router, auto_reconnect: bool) -> Self {
        Self {
            slack,
            router,
            auto_reconnect,
        }
    }

    pub async fn run(&self) -> AppResult<()> {
        loop {
            match self.run_connection().await {
                Ok(()) => {
                    if !self.auto_reconnect {
                        return Ok(());
                    }
                }
                Err(error) => {
                    if !self.auto_reconnect {
                        return Err(error);
                    }
                    tracing::error!("socket connection failed: {error}");
                }
            }
            tracing::info!("reconnecting in {RECONNECT_DELAY:?}");
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    async fn run_connection(&self) -> AppResult<()> {
        let url = self.slack.open_socket_url().await?;
        let (stream, _) = connect_async(url.as_str()).await.map_err(|err| {
            AppError::ChatTransport(format!("websocket connect failed: {err}"))
        })?;
        let (mut write, mut read) = stream.split();
        tracing::info!("connected to Slack socket mode");

        while let Some(frame) = read.next().await {
            let frame = frame.map_err(|err| {
                AppError::ChatTransport(format!("websocket read failed: {err}"))
            })?;
            match frame {
                WsMessage::Ping(data) => {
                    let _ = write.send(WsMessage::Pong(data)).await;
                }
                WsMessage::Close(_) => break,
                WsMessage::Text(raw) => {
                    let Ok(envelope) = serde_json::from_str::<SocketEnvelope>(&raw) else {
                        continue;
                    };
                    match envelope.envelope_type.as_str() {
                        "hello" => tracing::info!("socket mode session established"),
                        "disconnect" => {
                            tracing::info!("server requested reconnect");
                            break;
                        }
                        "events_api" => {
                            if let Some(id) = &envelope.envelope_id {
                                let ack = json!({ "envelope_id": id }).to_string();
                                write.send(WsMessage::Text(ack)).await.map_err(|err| {
                                    AppError::ChatTransport(format!(
                                        "websocket ack failed: {err}"
                                    ))
                                })?;
                            }
                            if let Some(message) = parse_event(&envelope.payload) {
                                self.router.dispatch(&message).await;
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Map a Slack events-api payload onto the router's message shape.
/// Bot-authored events are dropped so the bot never answers itself.
fn parse_event(payload: &Value) -> Option<IncomingMessage> {
    let event = payload.get("event")?;
    if event.get("bot_id").is_some() {
        return None;
    }
    if event.get("subtype").and_then(Value::as_str).is_some() {
        return None;
    }

    let event_type = event.get("type").and_then(Value::as_str)?;
    let text = event.get("text").and_then(Value::as_str).unwrap_or_default();
    let channel = event.get("channel").and_then(Value::as_str)?;

    let (kind, text) = match event_type {
        "app_mention" => (EventKind::DirectMention, strip_leading_mention(text)),
        "message" => {
            let channel_type = event
                .get("channel_type")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if channel_type == "im" {
                (EventKind::DirectMessage, text)
            } else if text.contains("<@") {
                (EventKind::Mention, text)
            } else {
                (EventKind::Ambient, text)
            }
        }
        _ => return None,
    };

    Some(IncomingMessage::new("message", text, channel, kind))
}

fn strip_leading_mention(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix("<@") {
        if let Some(end) = rest.find('>') {
            return rest[end + 1..].trim_start();
        }
    }
    text
}
