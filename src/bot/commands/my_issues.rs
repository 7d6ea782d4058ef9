use std::sync::Arc;

use async_trait::async_trait;

use crate::bot::commands::Command;
use crate::bot::format::{ListField, issue_list_body};
use crate::bot::talker::Talker;
use crate::domain::message::IncomingMessage;
use crate::services::IssueTrackerService;

/// `my issues`: everything assigned to the configured Jira user that is
/// still in flight, one line per issue with its status.
pub struct MyIssuesCommand {
    tracker: Arc<dyn IssueTrackerService>,
    assignee: String,
}

impl MyIssuesCommand {
    pub fn new(tracker: Arc<dyn IssueTrackerService>, assignee: String) -> Self {
        Self { tracker, assignee }
    }

    fn jql(&self) -> String {
        format!(
            "assignee = {} AND status in (Open, 'In Progress', Reopened, 'In Review')",
            self.assignee
        )
    }
}

#[async_trait]
impl Command for MyIssuesCommand {
    fn matches(&self, text: &str) -> bool {
        text.starts_with("my issues")
    }

    async fn execute(&self, _message: &IncomingMessage, talker: &Talker) {
        match self.tracker.search_issues(&self.jql()).await {
            Ok(issues) => {
                talker
                    .say_text(issue_list_body(&issues, ListField::Status))
                    .await;
            }
            Err(error) => {
                tracing::error!("my issues search failed: {error}");
                talker.say_text(error.to_string()).await;
            }
        }
    }

    fn short_help(&self) -> &str {
        "*my issues*: lists issues associated to me"
    }
}
