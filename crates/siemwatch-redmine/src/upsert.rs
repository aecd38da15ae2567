//! Ticket upsert engine.
//!
//! For each watch definition that accumulated events this run, decide
//! between creating a ticket, appending a note, or doing nothing — based on
//! whether the event texts already appear in an existing ticket's body or
//! journal. The engine never lets a tracker error escape the per-definition
//! boundary: one failing definition is logged and notified, and the caller's
//! loop moves on to the next.

use chrono::Local;
use tracing::{error, info, warn};

use siemwatch_core::{Notifier, WatchDefinition};

use crate::error::Result;
use crate::template::{IssueContext, IssueTemplate};
use crate::tracker::IssueTracker;
use crate::types::{
    IssueDraft, IssueNote, User, DEFAULT_PRIORITY_ID, STATUS_NEW_ID, STATUS_NEW_NAME,
};

pub struct UpsertEngine<'a> {
    tracker: &'a dyn IssueTracker,
    template: &'a IssueTemplate,
    notifier: &'a dyn Notifier,
}

impl<'a> UpsertEngine<'a> {
    pub fn new(
        tracker: &'a dyn IssueTracker,
        template: &'a IssueTemplate,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            tracker,
            template,
            notifier,
        }
    }

    /// Upsert one definition's accumulated events. Never returns an error;
    /// tracker failures are logged and forwarded to the notifier so sibling
    /// definitions still get processed.
    pub async fn upsert(&self, def: &WatchDefinition, user: &User) {
        info!(
            event_id = %def.event_id,
            events = def.events.len(),
            subject = %def.issue_subject,
            "upserting watched events"
        );

        if let Err(e) = self.try_upsert(def, user).await {
            error!(error = %e, event_id = %def.event_id, "tracker error during upsert");
            self.notifier
                .notify(&format!(
                    "redmine error `{e}` while upserting issues for event id {}",
                    def.event_id
                ))
                .await;
        }
    }

    async fn try_upsert(&self, def: &WatchDefinition, user: &User) -> Result<()> {
        let priority_id = def.issue_priority_id.unwrap_or(DEFAULT_PRIORITY_ID);

        let existing = self.tracker.find_todays_issues(&def.issue_subject).await?;
        let Some(issue) = existing.into_iter().next() else {
            return self.create(def, user, priority_id).await;
        };

        // Dedup stage 1: drop events already present in the ticket body.
        // Redmine stores descriptions with CRLF endings, ours use bare LF.
        let description = issue.description.replace('\r', "");
        let missing_in_desc: Vec<&str> = def
            .events
            .iter()
            .map(String::as_str)
            .filter(|e| !description.contains(*e))
            .collect();
        if missing_in_desc.is_empty() {
            warn!(
                url = %self.tracker.issue_url(issue.id),
                event_id = %def.event_id,
                "all events already present in issue description"
            );
            return Ok(());
        }

        // Dedup stage 2: drop what already appears in the journal notes.
        let full = self.tracker.issue_with_journals(issue.id).await?;
        let notes: String = full
            .journals
            .iter()
            .filter_map(|j| j.notes.as_deref())
            .collect();
        let new_events: Vec<&str> = missing_in_desc
            .into_iter()
            .filter(|e| !notes.contains(*e))
            .collect();
        if new_events.is_empty() {
            warn!(
                url = %self.tracker.issue_url(issue.id),
                event_id = %def.event_id,
                "all events already present in issue journal"
            );
            return Ok(());
        }

        let body = self
            .render(def, user, priority_id, new_events.concat(), issue.id)
            .await?;
        self.tracker
            .add_note(
                issue.id,
                &IssueNote {
                    notes: body,
                    status_id: STATUS_NEW_ID,
                    priority_id,
                },
            )
            .await?;
        info!(
            url = %self.tracker.issue_url(issue.id),
            event_id = %def.event_id,
            appended = new_events.len(),
            "issue updated"
        );
        Ok(())
    }

    async fn create(&self, def: &WatchDefinition, user: &User, priority_id: u32) -> Result<()> {
        let last_id = self.tracker.last_issue_id().await?;
        let events: String = def.events.iter().map(String::as_str).collect();
        let description = self.render(def, user, priority_id, events, last_id + 1).await?;

        let created = self
            .tracker
            .create_issue(&IssueDraft {
                subject: def.issue_subject.clone(),
                description,
                priority_id,
                assignee_id: user.id,
                event_id: def.event_id.clone(),
            })
            .await?;
        info!(
            url = %self.tracker.issue_url(created.id),
            event_id = %def.event_id,
            "issue created"
        );
        Ok(())
    }

    async fn render(
        &self,
        def: &WatchDefinition,
        user: &User,
        priority_id: u32,
        events: String,
        issue_id: u64,
    ) -> Result<String> {
        let priority = self.tracker.priority_name(priority_id).await?;
        self.template.render(&IssueContext {
            date: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            created_by: user.to_string(),
            subject: &def.issue_subject,
            status: STATUS_NEW_NAME,
            priority: &priority,
            event_id: &def.event_id,
            event_description: &def.issue_description,
            events,
            event_log: &def.event_log,
            issue_id,
        })
    }
}
