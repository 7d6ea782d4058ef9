use std::sync::Arc;

use async_trait::async_trait;

use crate::bot::commands::{Command, issue_key};
use crate::bot::talker::Talker;
use crate::domain::message::IncomingMessage;
use crate::services::IssueTrackerService;

/// Workflow transition ids for the board this bot drives.
const STATES: &[(&str, u32)] = &[("start", 11), ("review", 71), ("done", 91)];

/// `start|review|done <key>`: one command for every state transition,
/// keyed by the leading keyword. The transition is a single remote call;
/// success replies `Done`, failure replies the error text.
pub struct ChangeStateCommand {
    tracker: Arc<dyn IssueTrackerService>,
}

impl ChangeStateCommand {
    pub fn new(tracker: Arc<dyn IssueTrackerService>) -> Self {
        Self { tracker }
    }

    fn target_state(text: &str) -> Option<u32> {
        STATES
            .iter()
            .find(|(keyword, _)| text.starts_with(keyword))
            .map(|(_, id)| *id)
    }
}

#[async_trait]
impl Command for ChangeStateCommand {
    fn matches(&self, text: &str) -> bool {
        Self::target_state(text).is_some()
    }

    async fn execute(&self, message: &IncomingMessage, talker: &Talker) {
        let Some(transition_id) = Self::target_state(&message.text) else {
            return;
        };
        let key = issue_key(&message.text);
        match self.tracker.transition_issue(key, transition_id).await {
            Ok(()) => talker.say_text("Done").await,
            Err(error) => {
                tracing::error!("failed to transition {key}: {error}");
                talker.say_text(error.to_string()).await;
            }
        }
    }

    fn short_help(&self) -> &str {
        "*start*: changes the state from ToDo to In progress\n\
         *review*: changes the state from In progress to In review\n\
         *done*: changes the state from In review to Done"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::issue::Issue;
    use crate::domain::message::EventKind;
    use crate::domain::reply::ReplyPayload;
    use crate::error::{AppError, AppResult};
    use crate::services::ChatTransport;

    #[test]
    fn keywords_map_to_transition_ids() {
        assert_eq!(ChangeStateCommand::target_state("start ABC-1"), Some(11));
        assert_eq!(ChangeStateCommand::target_state("review ABC-1"), Some(71));
        assert_eq!(ChangeStateCommand::target_state("done ABC-1"), Some(91));
        assert_eq!(ChangeStateCommand::target_state("status ABC-1"), None);
    }

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<ReplyPayload>>,
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn reply(
            &self,
            _message: &IncomingMessage,
            payload: &ReplyPayload,
        ) -> AppResult<()> {
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeTracker {
        transitions: Mutex<Vec<(String, u32)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl IssueTrackerService for FakeTracker {
        async fn find_issue(&self, _key: &str) -> AppResult<Issue> {
            unreachable!()
        }
        async fn search_issues(&self, _jql: &str) -> AppResult<Vec<Issue>> {
            unreachable!()
        }
        async fn transition_issue(&self, key: &str, transition_id: u32) -> AppResult<()> {
            if let Some(message) = &self.fail_with {
                return Err(AppError::IssueTracker(message.clone()));
            }
            self.transitions
                .lock()
                .unwrap()
                .push((key.to_string(), transition_id));
            Ok(())
        }
    }

    fn message(text: &str) -> IncomingMessage {
        IncomingMessage::new("message", text, "C1", EventKind::Ambient)
    }

    fn sent_text(transport: &RecordingTransport) -> String {
        transport.sent.lock().unwrap()[0].text.clone().unwrap()
    }

    #[tokio::test]
    async fn successful_transition_replies_done() {
        let tracker = Arc::new(FakeTracker::default());
        let transport = Arc::new(RecordingTransport::default());
        let command = ChangeStateCommand::new(tracker.clone());
        let msg = message("start ABC-1");
        let talker = Talker::new(transport.clone(), msg.clone());

        command.execute(&msg, &talker).await;

        assert_eq!(
            *tracker.transitions.lock().unwrap(),
            vec![("ABC-1".to_string(), 11)]
        );
        assert_eq!(sent_text(&transport), "Done");
    }

    #[tokio::test]
    async fn failed_transition_replies_with_error_text() {
        let tracker = Arc::new(FakeTracker {
            transitions: Mutex::new(Vec::new()),
            fail_with: Some("no transition from here".to_string()),
        });
        let transport = Arc::new(RecordingTransport::default());
        let command = ChangeStateCommand::new(tracker);
        let msg = message("done ABC-1");
        let talker = Talker::new(transport.clone(), msg.clone());

        command.execute(&msg, &talker).await;

        assert_eq!(
            sent_text(&transport),
            "issue tracker error: no transition from here"
        );
    }
}
