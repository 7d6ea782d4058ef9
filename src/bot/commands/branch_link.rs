use async_trait::async_trait;

use crate::bot::commands::{Command, issue_key};
use crate::bot::format::build_issue_link;
use crate::bot::talker::Talker;
use crate::config::JiraConfig;
use crate::domain::message::IncomingMessage;

/// `branch <key>`: reply with the Jira deep link that opens the
/// create-branch dialog for the issue. No backend call involved.
pub struct BranchLinkCommand {
    jira: JiraConfig,
}

impl BranchLinkCommand {
    pub fn new(jira: JiraConfig) -> Self {
        Self { jira }
    }

    fn link(&self, key: &str) -> String {
        format!(
            "{}?devStatusDetailDialog=create-branch",
            build_issue_link(&self.jira, key)
        )
    }
}

#[async_trait]
impl Command for BranchLinkCommand {
    fn matches(&self, text: &str) -> bool {
        text.starts_with("branch")
    }

    async fn execute(&self, message: &IncomingMessage, talker: &Talker) {
        talker.say_text(self.link(issue_key(&message.text))).await;
    }

    fn short_help(&self) -> &str {
        "*branch*: generates create branch link for issue"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_create_branch_deep_link() {
        let jira = JiraConfig {
            protocol: "https".to_string(),
            host: "jira.example.com".to_string(),
            port: 443,
            base: None,
            user: "bot".to_string(),
            pass: None,
            api_version: "2".to_string(),
            response: Default::default(),
            sprint_field: None,
            custom_fields: Default::default(),
        };
        let command = BranchLinkCommand::new(jira);
        assert_eq!(
            command.link("ABC-1"),
            "https://jira.example.com:443/browse/ABC-1?devStatusDetailDialog=create-branch"
        );
    }
}
