//! Async client for the Ariel searches API.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, warn};

use siemwatch_core::SearchRow;

use crate::error::{QRadarError, Result};
use crate::types::{ArielResults, ArielSearch};

/// Request timeout; Ariel endpoints on loaded consoles can be slow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for one QRadar console.
pub struct QRadarClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl QRadarClient {
    /// Create a new client against the given console URL.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            // QRadar consoles routinely run self-signed certificates.
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self::with_http_client(base_url, username, password, http))
    }

    /// Create a client with a custom HTTP client (for testing with mockito).
    pub fn with_http_client(
        base_url: &str,
        username: &str,
        password: &str,
        http: Client,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Submit an AQL query, returning the id of the created search.
    ///
    /// A response without a `search_id` is an error; the caller must abort
    /// the cycle, there is nothing to poll.
    pub async fn submit_search(&self, aql_query: &str) -> Result<String> {
        let url = format!("{}/api/ariel/searches", self.base_url);
        debug!(url = %url, "submitting ariel search");

        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("query_expression", aql_query)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(QRadarError::UnexpectedStatus(resp.status()));
        }

        let search: ArielSearch = resp.json().await?;
        let search_id = search.search_id.ok_or(QRadarError::MissingSearchId)?;
        debug!(search_id = %search_id, "ariel search created");
        Ok(search_id)
    }

    /// Poll the search status at a fixed delay until it reports completion.
    ///
    /// There is deliberately no attempt cap: an unresponsive console keeps
    /// this polling forever, matching the operational contract that the
    /// external scheduler is the watchdog. A transport failure or non-2xx
    /// status ends the wait with an error immediately. A status body without
    /// the `completed` flag is treated as finished so a malformed response
    /// degrades to an empty result set instead of an infinite loop.
    pub async fn await_completion(&self, search_id: &str, poll_delay: Duration) -> Result<()> {
        let url = format!("{}/api/ariel/searches/{}", self.base_url, search_id);

        loop {
            let resp = self
                .http
                .get(&url)
                .basic_auth(&self.username, Some(&self.password))
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(QRadarError::UnexpectedStatus(resp.status()));
            }

            let search: ArielSearch = resp.json().await?;
            if search.completed.unwrap_or(true) {
                debug!(
                    search_id,
                    status = search.status.as_deref().unwrap_or("?"),
                    records = search.record_count.unwrap_or(0),
                    "ariel search completed"
                );
                return Ok(());
            }

            debug!(
                search_id,
                status = search.status.as_deref().unwrap_or("?"),
                "ariel search still running"
            );
            tokio::time::sleep(poll_delay).await;
        }
    }

    /// Fetch the result rows of a completed search.
    ///
    /// Never fails: any transport or decode problem is logged and yields an
    /// empty row set, which the cycle treats as "nothing found".
    pub async fn fetch_results(&self, search_id: &str) -> Vec<SearchRow> {
        let url = format!("{}/api/ariel/searches/{}/results", self.base_url, search_id);

        let resp = match self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, search_id, "failed to fetch search results");
                return Vec::new();
            }
        };
        if !resp.status().is_success() {
            error!(status = %resp.status(), search_id, "search results request rejected");
            return Vec::new();
        }

        match resp.json::<ArielResults>().await {
            Ok(results) => {
                debug!(search_id, rows = results.events.len(), "fetched search results");
                results.events
            }
            Err(e) => {
                warn!(error = %e, search_id, "could not decode search results");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> QRadarClient {
        QRadarClient::with_http_client(&server.url(), "api", "secret", Client::new())
    }

    #[tokio::test]
    async fn submit_returns_search_id() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/ariel/searches")
            .match_query(mockito::Matcher::UrlEncoded(
                "query_expression".into(),
                "SELECT * FROM events".into(),
            ))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"search_id": "abc-123", "status": "WAIT"}"#)
            .create_async()
            .await;

        let id = client_for(&server)
            .submit_search("SELECT * FROM events")
            .await
            .unwrap();
        assert_eq!(id, "abc-123");
    }

    #[tokio::test]
    async fn submit_without_search_id_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/ariel/searches")
            .match_query(mockito::Matcher::Any)
            .with_status(201)
            .with_body(r#"{"status": "WAIT"}"#)
            .create_async()
            .await;

        let err = client_for(&server).submit_search("q").await.unwrap_err();
        assert!(matches!(err, QRadarError::MissingSearchId));
    }

    #[tokio::test]
    async fn submit_rejection_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/ariel/searches")
            .match_query(mockito::Matcher::Any)
            .with_status(422)
            .with_body(r#"{"message": "bad AQL"}"#)
            .create_async()
            .await;

        let err = client_for(&server).submit_search("q").await.unwrap_err();
        assert!(matches!(err, QRadarError::UnexpectedStatus(s) if s.as_u16() == 422));
    }

    #[tokio::test]
    async fn await_returns_once_completed() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/api/ariel/searches/abc-123")
            .with_status(200)
            .with_body(r#"{"search_id": "abc-123", "status": "COMPLETED", "completed": true}"#)
            .create_async()
            .await;

        client_for(&server)
            .await_completion("abc-123", Duration::from_millis(1))
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn await_treats_missing_completed_flag_as_done() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/ariel/searches/abc-123")
            .with_status(200)
            .with_body(r#"{"search_id": "abc-123"}"#)
            .create_async()
            .await;

        client_for(&server)
            .await_completion("abc-123", Duration::from_millis(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn await_fails_fast_on_rejected_status_request() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/ariel/searches/abc-123")
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server)
            .await_completion("abc-123", Duration::from_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(err, QRadarError::UnexpectedStatus(_)));
    }

    #[tokio::test]
    async fn fetch_decodes_rows() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/ariel/searches/abc-123/results")
            .with_status(200)
            .with_body(
                r#"{"events": [
                    {"event_id": "4720", "src_user": "admin", "dst_user": "temp01",
                     "group_name": null, "log": "<13>raw"},
                    {"event_id": "1102"}
                ]}"#,
            )
            .create_async()
            .await;

        let rows = client_for(&server).fetch_results("abc-123").await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].src_user.as_deref(), Some("admin"));
        assert!(rows[0].group_name.is_none());
        assert!(rows[1].log.is_none());
    }

    #[tokio::test]
    async fn fetch_failure_yields_empty_rows() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/ariel/searches/abc-123/results")
            .with_status(500)
            .create_async()
            .await;

        let rows = client_for(&server).fetch_results("abc-123").await;
        assert!(rows.is_empty());
    }
}
