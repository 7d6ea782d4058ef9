use std::sync::Arc;

use async_trait::async_trait;

use crate::bot::commands::{Command, issue_key};
use crate::bot::format::format_issue;
use crate::bot::talker::Talker;
use crate::config::{AppConfig, ResponseMode};
use crate::domain::message::{EventKind, IncomingMessage};
use crate::services::IssueTrackerService;

/// `status <key>`: look an issue up and reply with its details. A
/// direct mention always gets the full field grid; otherwise the
/// configured display default applies.
pub struct StatusCommand {
    tracker: Arc<dyn IssueTrackerService>,
    config: AppConfig,
}

impl StatusCommand {
    pub fn new(tracker: Arc<dyn IssueTrackerService>, config: AppConfig) -> Self {
        Self { tracker, config }
    }
}

#[async_trait]
impl Command for StatusCommand {
    fn matches(&self, text: &str) -> bool {
        text.starts_with("status")
    }

    async fn execute(&self, message: &IncomingMessage, talker: &Talker) {
        let key = issue_key(&message.text);
        match self.tracker.find_issue(key).await {
            Ok(issue) => {
                let mode = if message.event == EventKind::DirectMention {
                    ResponseMode::Full
                } else {
                    self.config.jira.response
                };
                talker
                    .say_attachment(format_issue(&issue, mode, &self.config))
                    .await;
            }
            Err(error) => {
                tracing::error!("failed to find {key}: {error}");
                talker.say_text(error.to_string()).await;
            }
        }
    }

    fn short_help(&self) -> &str {
        "*status*: shows details for an issue"
    }
}
