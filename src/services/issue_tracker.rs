use async_trait::async_trait;

use crate::domain::issue::Issue;
use crate::error::AppResult;

/// The three tracker operations the bot consumes. Network, auth and
/// retry policy live behind this seam.
#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn find_issue(&self, key: &str) -> AppResult<Issue>;
    async fn search_issues(&self, jql: &str) -> AppResult<Vec<Issue>>;
    async fn transition_issue(&self, key: &str, transition_id: u32) -> AppResult<()>;
}
