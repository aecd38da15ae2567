//! MS Teams workflow notifications.
//!
//! Best effort by contract: every failure path logs and returns, nothing
//! here ever produces an error the cycle would have to handle.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error};

use siemwatch_core::Notifier;

use crate::config::TeamsSettings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts Adaptive Cards to a Teams workflow URL.
pub struct TeamsNotifier {
    http: Client,
    workflow_url: Option<String>,
    title: String,
}

impl TeamsNotifier {
    pub fn new(settings: &TeamsSettings) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http_client(settings, http))
    }

    /// Create a notifier with a custom HTTP client (for testing with mockito).
    pub fn with_http_client(settings: &TeamsSettings, http: Client) -> Self {
        Self {
            http,
            workflow_url: settings.workflow_url.clone(),
            title: settings.title.clone(),
        }
    }

    pub async fn send(&self, message: &str) {
        let Some(url) = self.workflow_url.as_deref() else {
            error!("teams workflow_url not configured, message will not be sent");
            return;
        };

        let card = json!({
            "type": "message",
            "attachments": [{
                "contentType": "application/vnd.microsoft.card.adaptive",
                "content": {
                    "$schema": "https://adaptivecards.io/schemas/adaptive-card.json",
                    "type": "AdaptiveCard",
                    "msTeams": { "width": "full" },
                    "body": [
                        {
                            "type": "TextBlock",
                            "text": self.title,
                            "size": "large",
                            "weight": "bolder",
                        },
                        {
                            "type": "TextBlock",
                            "text": message,
                            "wrap": true,
                        },
                    ],
                },
            }],
        });

        match self.http.post(url).json(&card).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!("teams notification sent");
            }
            Ok(resp) => {
                error!(status = %resp.status(), "teams workflow rejected notification");
            }
            Err(e) => {
                error!(error = %e, "failed to send teams notification");
            }
        }
    }
}

#[async_trait]
impl Notifier for TeamsNotifier {
    async fn notify(&self, message: &str) {
        self.send(message).await;
    }
}
