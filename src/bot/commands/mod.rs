mod branch_link;
mod change_state;
mod my_issues;
mod open_issues;
mod status;

use async_trait::async_trait;

pub use branch_link::BranchLinkCommand;
pub use change_state::ChangeStateCommand;
pub use my_issues::MyIssuesCommand;
pub use open_issues::OpenIssuesCommand;
pub use status::StatusCommand;

use crate::bot::talker::Talker;
use crate::context::AppContext;
use crate::domain::message::IncomingMessage;

/// One registered chat instruction: a prefix predicate, an action and a
/// help line. Commands never return errors; backend failures become
/// reply text.
#[async_trait]
pub trait Command: Send + Sync {
    /// Case-sensitive prefix test against the raw message text.
    fn matches(&self, text: &str) -> bool;

    async fn execute(&self, message: &IncomingMessage, talker: &Talker);

    /// One help entry, `*keyword*: what it does`.
    fn short_help(&self) -> &str;
}

/// The command set in its registration order. Order is the only
/// tie-break between overlapping prefixes, so it is load-bearing:
/// `status` must precede the state transitions and `my issues` /
/// `open issues` must precede any future bare `my` / `open` command.
pub fn default_commands(ctx: &AppContext) -> Vec<Box<dyn Command>> {
    vec![
        Box::new(StatusCommand::new(ctx.tracker.clone(), ctx.config.clone())),
        Box::new(ChangeStateCommand::new(ctx.tracker.clone())),
        Box::new(MyIssuesCommand::new(
            ctx.tracker.clone(),
            ctx.config.jira.user.clone(),
        )),
        Box::new(OpenIssuesCommand::new(ctx.tracker.clone())),
        Box::new(BranchLinkCommand::new(ctx.config.jira.clone())),
    ]
}

/// Second whitespace-delimited token, taken verbatim as the issue key.
/// No format validation happens at this layer; a bad key surfaces as a
/// tracker error in the reply.
pub(crate) fn issue_key(text: &str) -> &str {
    text.split_whitespace().nth(1).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_second_token_verbatim() {
        assert_eq!(issue_key("status ABC-1"), "ABC-1");
        assert_eq!(issue_key("start  abc-lowercase extra"), "abc-lowercase");
        assert_eq!(issue_key("status"), "");
    }
}
