//! The tracker capability trait the upsert engine depends on.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Issue, IssueDraft, IssueNote, User};

/// Operations the ticket upsert engine needs from an issue tracker.
///
/// Implemented over REST by [`crate::client::RedmineClient`] and by
/// in-memory fakes in tests. Methods map one-to-one onto the decisions in
/// [`crate::upsert`]: existence check, create, duplicate inspection, append.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// The user the configured credentials authenticate as.
    async fn current_user(&self) -> Result<User>;

    /// Issues in the watched project/tracker with this subject, created today
    /// ("today" by the tracker's own date granularity).
    async fn find_todays_issues(&self, subject: &str) -> Result<Vec<Issue>>;

    /// Re-read one issue with its journal entries populated.
    async fn issue_with_journals(&self, issue_id: u64) -> Result<Issue>;

    /// Create a new issue, returning it.
    async fn create_issue(&self, draft: &IssueDraft) -> Result<Issue>;

    /// Append a note to an existing issue and reset its triage fields.
    async fn add_note(&self, issue_id: u64, note: &IssueNote) -> Result<()>;

    /// Resolve a priority id to its display name.
    async fn priority_name(&self, priority_id: u32) -> Result<String>;

    /// Id of the most recently created issue across the instance, 0 when
    /// there are none. Used as the next-issue-number hint in descriptions.
    async fn last_issue_id(&self) -> Result<u64>;

    /// Browser URL of an issue, for log lines.
    fn issue_url(&self, issue_id: u64) -> String;
}
