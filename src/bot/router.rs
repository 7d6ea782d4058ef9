use std::sync::Arc;

use crate::bot::commands::Command;
use crate::bot::talker::Talker;
use crate::domain::message::IncomingMessage;
use crate::services::ChatTransport;

/// Ordered command list with first-match-wins dispatch. Exactly one
/// reply goes out per dispatched message: the matched command's, or the
/// help listing. Messages that are not plain text are logged and
/// ignored.
pub struct Router {
    transport: Arc<dyn ChatTransport>,
    commands: Vec<Box<dyn Command>>,
}

impl Router {
    pub fn new(transport: Arc<dyn ChatTransport>, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            transport,
            commands,
        }
    }

    pub async fn dispatch(&self, message: &IncomingMessage) {
        if message.kind != "message" || message.text.is_empty() {
            tracing::info!(kind = %message.kind, "ignoring non-text message");
            return;
        }

        let talker = Talker::new(self.transport.clone(), message.clone());
        for command in &self.commands {
            if command.matches(&message.text) {
                tracing::debug!(text = %message.text, "dispatching command");
                command.execute(message, &talker).await;
                return;
            }
        }

        tracing::debug!(text = %message.text, "no command matched, sending help");
        talker.say_text(self.help_text()).await;
    }

    /// Every command's help entry, in registration order.
    pub fn help_text(&self) -> String {
        self.commands
            .iter()
            .map(|command| command.short_help())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::message::EventKind;
    use crate::domain::reply::ReplyPayload;
    use crate::error::AppResult;

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

    struct StubCommand {
        keyword: &'static str,
        help: &'static str,
        matched: Arc<AtomicUsize>,
        executed: Arc<AtomicUsize>,
    }

    impl StubCommand {
        fn new(keyword: &'static str, help: &'static str) -> Self {
            Self {
                keyword,
                help,
                matched: Arc::new(AtomicUsize::new(0)),
                executed: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Command for StubCommand {
        fn matches(&self, text: &str) -> bool {
            self.matched.fetch_add(1, Ordering::SeqCst);
            text.starts_with(self.keyword)
        }

        async fn execute(&self, _message: &IncomingMessage, talker: &Talker) {
            self.executed.fetch_add(1, Ordering::SeqCst);
            talker.say_text(format!("ran {}", self.keyword)).await;
        }

        fn short_help(&self) -> &str {
            self.help
        }
    }

    fn message(kind: &str, text: &str) -> IncomingMessage {
        IncomingMessage::new(kind, text, "C123", EventKind::Ambient)
    }

    fn sent_texts(transport: &RecordingTransport) -> Vec<String> {
        transport
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|payload| payload.text.clone().unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn ignores_non_message_events_and_empty_text() {
        let transport = Arc::new(RecordingTransport::default());
        let router = Router::new(
            transport.clone(),
            vec![Box::new(StubCommand::new("status", "*status*: help"))],
        );

        router.dispatch(&message("presence_change", "status ABC-1")).await;
        router.dispatch(&message("message", "")).await;

        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn first_registered_match_wins_and_later_is_never_evaluated() {
        let first = StubCommand::new("open", "*open*: first");
        let second = StubCommand::new("open issues", "*open issues*: second");
        let first_executed = first.executed.clone();
        let second_matched = second.matched.clone();
        let second_executed = second.executed.clone();

        let transport = Arc::new(RecordingTransport::default());
        let router = Router::new(transport.clone(), vec![Box::new(first), Box::new(second)]);

        router.dispatch(&message("message", "open issues TEAM")).await;

        assert_eq!(first_executed.load(Ordering::SeqCst), 1);
        assert_eq!(second_matched.load(Ordering::SeqCst), 0);
        assert_eq!(second_executed.load(Ordering::SeqCst), 0);
        assert_eq!(sent_texts(&transport), vec!["ran open".to_string()]);
    }

    #[tokio::test]
    async fn unmatched_text_gets_help_in_registration_order() {
        let transport = Arc::new(RecordingTransport::default());
        let router = Router::new(
            transport.clone(),
            vec![
                Box::new(StubCommand::new("status", "*status*: shows an issue")),
                Box::new(StubCommand::new("branch", "*branch*: makes a link")),
            ],
        );

        router.dispatch(&message("message", "what do you do")).await;

        assert_eq!(
            sent_texts(&transport),
            vec!["*status*: shows an issue\n*branch*: makes a link".to_string()]
        );
    }

    #[tokio::test]
    async fn exactly_one_reply_per_dispatch() {
        let transport = Arc::new(RecordingTransport::default());
        let router = Router::new(
            transport.clone(),
            vec![Box::new(StubCommand::new("status", "*status*: help"))],
        );

        router.dispatch(&message("message", "status ABC-1")).await;
        router.dispatch(&message("message", "gibberish")).await;

        assert_eq!(transport.sent.lock().unwrap().len(), 2);
    }
}
