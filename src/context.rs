use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{ChatTransport, IssueTrackerService};

/// Shared collaborators handed to command construction: immutable config
/// plus the two external services behind their trait seams.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub tracker: Arc<dyn IssueTrackerService>,
    pub chat: Arc<dyn ChatTransport>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        tracker: Arc<dyn IssueTrackerService>,
        chat: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            config,
            tracker,
            chat,
        }
    }
}
