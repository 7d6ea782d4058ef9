use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::domain::message::IncomingMessage;
use crate::domain::reply::ReplyPayload;
use crate::error::{AppError, AppResult};
use crate::services::ChatTransport;

const API_BASE: &str = "https://slack.com/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin Slack Web API client. Replies go through `chat.postMessage`;
/// the socket-mode URL for the event loop comes from
/// `apps.connections.open`.
pub struct SlackClient {
    http: Client,
    app_token: String,
    bot_token: String,
}

#[derive(Deserialize)]
struct SlackOpenSocketResponse {
    ok: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct SlackPostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackClient {
    pub fn new(app_token: String, bot_token: String) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| {
                AppError::Configuration(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            http,
            app_token,
            bot_token,
        })
    }

    /// Ask Slack for a fresh socket-mode websocket URL.
    pub async fn open_socket_url(&self) -> AppResult<String> {
        let response = self
            .http
            .post(format!("{API_BASE}/apps.connections.open"))
            .bearer_auth(&self.app_token)
            .send()
            .await
            .map_err(|err| AppError::ChatTransport(format!("failed to call Slack: {err}")))?;

        let payload: SlackOpenSocketResponse = response.json().await.map_err(|err| {
            AppError::ChatTransport(format!("failed to parse Slack response: {err}"))
        })?;

        if !payload.ok {
            return Err(AppError::ChatTransport(format!(
                "apps.connections.open failed: {}",
                payload.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        payload.url.ok_or_else(|| {
            AppError::ChatTransport("apps.connections.open returned no URL".to_string())
        })
    }
}

#[async_trait]
impl ChatTransport for SlackClient {
    async fn reply(&self, message: &IncomingMessage, payload: &ReplyPayload) -> AppResult<()> {
        let body = json!({
            "channel": message.channel,
            "as_user": true,
            "text": payload.text,
            "attachments": payload.attachments,
        });

        let response = self
            .http
            .post(format!("{API_BASE}/chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::ChatTransport(format!("failed to call Slack: {err}")))?;

        let result: SlackPostMessageResponse = response.json().await.map_err(|err| {
            AppError::ChatTransport(format!("failed to parse Slack response: {err}"))
        })?;

        if !result.ok {
            return Err(AppError::ChatTransport(format!(
                "chat.postMessage failed: {}",
                result.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        Ok(())
    }
}
