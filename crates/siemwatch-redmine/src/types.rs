//! Redmine resource types. Only the fields the upsert engine reads are
//! modeled; everything else on the wire is ignored.

use std::fmt;

use serde::Deserialize;

/// Default issue priority when a watch definition carries none.
pub const DEFAULT_PRIORITY_ID: u32 = 2;
pub const DEFAULT_PRIORITY_NAME: &str = "Medium";

/// Status every created or re-opened issue is set to.
pub const STATUS_NEW_ID: u32 = 1;
pub const STATUS_NEW_NAME: &str = "New";

/// Custom field carrying the vendor event id on created issues.
pub const EVENT_ID_FIELD_ID: u32 = 10;

/// The authenticated Redmine user; issues are assigned to it.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = format!("{} {}", self.firstname, self.lastname);
        let full = full.trim();
        if !full.is_empty() {
            write!(f, "{full}")
        } else if !self.login.is_empty() {
            write!(f, "{}", self.login)
        } else {
            write!(f, "user #{}", self.id)
        }
    }
}

/// An id/name pair as embedded in issue status and priority fields.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub id: u32,
    pub name: String,
}

/// A journal (comment) entry on an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct Journal {
    pub id: u64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A tracker issue. Journals are only populated when the issue was fetched
/// with `include=journals`.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: u64,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub journals: Vec<Journal>,
    #[serde(default)]
    pub status: Option<NamedRef>,
    #[serde(default)]
    pub priority: Option<NamedRef>,
}

/// Fields of an issue to be created.
#[derive(Debug, Clone)]
pub struct IssueDraft {
    pub subject: String,
    pub description: String,
    pub priority_id: u32,
    pub assignee_id: u64,
    /// Vendor event id, recorded in the issue's custom field.
    pub event_id: String,
}

impl IssueDraft {
    /// Value of the event-id custom field: numeric Windows event ids are
    /// tagged with their platform, anything else is recorded verbatim.
    pub fn custom_field_value(&self) -> String {
        let numeric =
            !self.event_id.is_empty() && self.event_id.chars().all(|c| c.is_ascii_digit());
        if numeric {
            format!("Windows\t{}", self.event_id)
        } else {
            self.event_id.clone()
        }
    }
}

/// A note appended to an existing issue, together with the field resets
/// that re-surface it in triage.
#[derive(Debug, Clone)]
pub struct IssueNote {
    pub notes: String,
    pub status_id: u32,
    pub priority_id: u32,
}
