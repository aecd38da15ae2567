//! REST implementation of [`IssueTracker`] against the Redmine API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{RedmineError, Result};
use crate::tracker::IssueTracker;
use crate::types::{
    Issue, IssueDraft, IssueNote, NamedRef, User, DEFAULT_PRIORITY_NAME, EVENT_ID_FIELD_ID,
    STATUS_NEW_ID,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for one Redmine instance, scoped to one project and tracker.
pub struct RedmineClient {
    http: Client,
    base_url: String,
    api_key: String,
    project_id: u32,
    tracker_id: u32,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Debug, Deserialize)]
struct IssuesResponse {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    issue: Issue,
}

#[derive(Debug, Deserialize)]
struct PrioritiesResponse {
    #[serde(default)]
    issue_priorities: Vec<NamedRef>,
}

impl RedmineClient {
    pub fn new(base_url: &str, api_key: &str, project_id: u32, tracker_id: u32) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http_client(
            base_url, api_key, project_id, tracker_id, http,
        ))
    }

    /// Create a client with a custom HTTP client (for testing with mockito).
    pub fn with_http_client(
        base_url: &str,
        api_key: &str,
        project_id: u32,
        tracker_id: u32,
        http: Client,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            project_id,
            tracker_id,
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .header("X-Redmine-API-Key", &self.api_key)
    }

    /// Check a response status, mapping any non-success to an error.
    fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(RedmineError::UnexpectedStatus(resp.status()))
        }
    }
}

#[async_trait]
impl IssueTracker for RedmineClient {
    async fn current_user(&self) -> Result<User> {
        let resp = Self::check(self.get("/users/current.json").send().await?)?;
        let body: UserResponse = resp.json().await?;
        debug!(user = %body.user, "authenticated against redmine");
        Ok(body.user)
    }

    async fn find_todays_issues(&self, subject: &str) -> Result<Vec<Issue>> {
        let today = Local::now().format("%Y-%m-%d").to_string();
        let resp = Self::check(
            self.get("/issues.json")
                .query(&[
                    ("project_id", self.project_id.to_string().as_str()),
                    ("tracker_id", self.tracker_id.to_string().as_str()),
                    ("status_id", "*"),
                    ("subject", subject),
                    ("created_on", &today),
                ])
                .send()
                .await?,
        )?;
        let body: IssuesResponse = resp.json().await?;
        debug!(subject, count = body.issues.len(), "filtered today's issues");
        Ok(body.issues)
    }

    async fn issue_with_journals(&self, issue_id: u64) -> Result<Issue> {
        let resp = Self::check(
            self.get(&format!("/issues/{issue_id}.json"))
                .query(&[("include", "journals")])
                .send()
                .await?,
        )?;
        let body: IssueResponse = resp.json().await?;
        Ok(body.issue)
    }

    async fn create_issue(&self, draft: &IssueDraft) -> Result<Issue> {
        let body = json!({
            "issue": {
                "project_id": self.project_id,
                "tracker_id": self.tracker_id,
                "subject": draft.subject,
                "description": draft.description,
                "status_id": STATUS_NEW_ID,
                "priority_id": draft.priority_id,
                "assigned_to_id": draft.assignee_id,
                "custom_fields": [
                    { "id": EVENT_ID_FIELD_ID, "value": draft.custom_field_value() }
                ],
            }
        });
        let resp = Self::check(
            self.http
                .post(format!("{}/issues.json", self.base_url))
                .header("X-Redmine-API-Key", &self.api_key)
                .json(&body)
                .send()
                .await?,
        )?;
        let body: IssueResponse = resp.json().await?;
        Ok(body.issue)
    }

    async fn add_note(&self, issue_id: u64, note: &IssueNote) -> Result<()> {
        let body = json!({
            "issue": {
                "notes": note.notes,
                "status_id": note.status_id,
                "priority_id": note.priority_id,
            }
        });
        Self::check(
            self.http
                .put(format!("{}/issues/{issue_id}.json", self.base_url))
                .header("X-Redmine-API-Key", &self.api_key)
                .json(&body)
                .send()
                .await?,
        )?;
        Ok(())
    }

    async fn priority_name(&self, priority_id: u32) -> Result<String> {
        let resp = Self::check(
            self.get("/enumerations/issue_priorities.json")
                .send()
                .await?,
        )?;
        let body: PrioritiesResponse = resp.json().await?;
        Ok(body
            .issue_priorities
            .into_iter()
            .find(|p| p.id == priority_id)
            .map(|p| p.name)
            .unwrap_or_else(|| DEFAULT_PRIORITY_NAME.to_string()))
    }

    async fn last_issue_id(&self) -> Result<u64> {
        let resp = Self::check(
            self.get("/issues.json")
                .query(&[("sort", "created_on:desc"), ("limit", "1")])
                .send()
                .await?,
        )?;
        let body: IssuesResponse = resp.json().await?;
        Ok(body.issues.first().map(|i| i.id).unwrap_or(0))
    }

    fn issue_url(&self, issue_id: u64) -> String {
        format!("{}/issues/{issue_id}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> RedmineClient {
        RedmineClient::with_http_client(&server.url(), "key-123", 42, 6, Client::new())
    }

    #[tokio::test]
    async fn current_user_sends_api_key() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/users/current.json")
            .match_header("X-Redmine-API-Key", "key-123")
            .with_status(200)
            .with_body(r#"{"user": {"id": 9, "login": "soc-bot"}}"#)
            .create_async()
            .await;

        let user = client_for(&server).current_user().await.unwrap();
        assert_eq!(user.id, 9);
        assert_eq!(user.to_string(), "soc-bot");
    }

    #[tokio::test]
    async fn auth_failure_maps_to_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/users/current.json")
            .with_status(401)
            .create_async()
            .await;

        let err = client_for(&server).current_user().await.unwrap_err();
        assert!(matches!(err, RedmineError::UnexpectedStatus(s) if s.as_u16() == 401));
    }

    #[tokio::test]
    async fn find_filters_by_project_tracker_subject_and_date() {
        let mut server = mockito::Server::new_async().await;
        let today = Local::now().format("%Y-%m-%d").to_string();
        let _m = server
            .mock("GET", "/issues.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("project_id".into(), "42".into()),
                Matcher::UrlEncoded("tracker_id".into(), "6".into()),
                Matcher::UrlEncoded("status_id".into(), "*".into()),
                Matcher::UrlEncoded("subject".into(), "New local users".into()),
                Matcher::UrlEncoded("created_on".into(), today),
            ]))
            .with_status(200)
            .with_body(
                r#"{"issues": [{"id": 101, "subject": "New local users",
                               "description": "body"}]}"#,
            )
            .create_async()
            .await;

        let issues = client_for(&server)
            .find_todays_issues("New local users")
            .await
            .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, 101);
        assert!(issues[0].journals.is_empty());
    }

    #[tokio::test]
    async fn create_posts_expected_fields() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/issues.json")
            .match_body(Matcher::PartialJson(json!({
                "issue": {
                    "project_id": 42,
                    "tracker_id": 6,
                    "subject": "New local users",
                    "status_id": 1,
                    "priority_id": 3,
                    "assigned_to_id": 9,
                    "custom_fields": [{"id": 10, "value": "Windows\t4720"}],
                }
            })))
            .with_status(201)
            .with_body(r#"{"issue": {"id": 102, "subject": "New local users"}}"#)
            .create_async()
            .await;

        let draft = IssueDraft {
            subject: "New local users".into(),
            description: "rendered".into(),
            priority_id: 3,
            assignee_id: 9,
            event_id: "4720".into(),
        };
        let issue = client_for(&server).create_issue(&draft).await.unwrap();
        assert_eq!(issue.id, 102);
    }

    #[tokio::test]
    async fn add_note_puts_status_and_priority_reset() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("PUT", "/issues/101.json")
            .match_body(Matcher::PartialJson(json!({
                "issue": {"notes": "the note", "status_id": 1, "priority_id": 2}
            })))
            .with_status(204)
            .create_async()
            .await;

        let note = IssueNote {
            notes: "the note".into(),
            status_id: 1,
            priority_id: 2,
        };
        client_for(&server).add_note(101, &note).await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn issue_with_journals_requests_include() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/issues/101.json")
            .match_query(Matcher::UrlEncoded("include".into(), "journals".into()))
            .with_status(200)
            .with_body(
                r#"{"issue": {"id": 101, "journals": [
                    {"id": 1, "notes": "first"},
                    {"id": 2, "notes": null}
                ]}}"#,
            )
            .create_async()
            .await;

        let issue = client_for(&server).issue_with_journals(101).await.unwrap();
        assert_eq!(issue.journals.len(), 2);
        assert_eq!(issue.journals[0].notes.as_deref(), Some("first"));
        assert!(issue.journals[1].notes.is_none());
    }

    #[tokio::test]
    async fn priority_name_resolves_or_defaults() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/enumerations/issue_priorities.json")
            .with_status(200)
            .with_body(
                r#"{"issue_priorities": [
                    {"id": 2, "name": "Medium"}, {"id": 4, "name": "Urgent"}
                ]}"#,
            )
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.priority_name(4).await.unwrap(), "Urgent");
        // Unknown id falls back to the default name.
        assert_eq!(client.priority_name(99).await.unwrap(), "Medium");
    }

    #[tokio::test]
    async fn last_issue_id_is_zero_on_empty_instance() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/issues.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sort".into(), "created_on:desc".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"issues": []}"#)
            .create_async()
            .await;

        assert_eq!(client_for(&server).last_issue_id().await.unwrap(), 0);
    }
}
