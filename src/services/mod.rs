pub mod chat;
pub mod issue_tracker;

pub use chat::ChatTransport;
pub use issue_tracker::IssueTrackerService;
