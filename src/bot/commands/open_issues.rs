use std::sync::Arc;

use async_trait::async_trait;

use crate::bot::commands::Command;
use crate::bot::format::{ListField, issue_list_body};
use crate::bot::talker::Talker;
use crate::domain::message::IncomingMessage;
use crate::services::IssueTrackerService;

/// `open issues <project>`: unstarted bugs for a project, most urgent
/// first, one line per issue with its priority.
pub struct OpenIssuesCommand {
    tracker: Arc<dyn IssueTrackerService>,
}

impl OpenIssuesCommand {
    pub fn new(tracker: Arc<dyn IssueTrackerService>) -> Self {
        Self { tracker }
    }

    fn jql(project: &str) -> String {
        format!(
            "project = {project} AND Status = 'To Do' AND Type = Bug ORDER BY priority DESC, created"
        )
    }
}

#[async_trait]
impl Command for OpenIssuesCommand {
    fn matches(&self, text: &str) -> bool {
        text.starts_with("open issues")
    }

    async fn execute(&self, message: &IncomingMessage, talker: &Talker) {
        // Third token is the project key, verbatim.
        let project = message.text.split_whitespace().nth(2).unwrap_or_default();
        match self.tracker.search_issues(&Self::jql(project)).await {
            Ok(issues) => {
                talker
                    .say_text(issue_list_body(&issues, ListField::Priority))
                    .await;
            }
            Err(error) => {
                tracing::error!("open issues search failed for {project}: {error}");
                talker.say_text(error.to_string()).await;
            }
        }
    }

    fn short_help(&self) -> &str {
        "*open issues*: lists open issues"
    }
}
