use anyhow::Context;
use async_trait::async_trait;

use super::{Notification, NotificationSink};

/// Delivers notifications through an HTTP mail relay (JSON POST, bearer auth).
pub struct MailRelaySink {
    api_url: String,
    api_token: String,
    from: String,
    client: reqwest::Client,
}

impl MailRelaySink {
    pub fn new(api_url: String, api_token: String, from: String) -> Self {
        Self {
            api_url,
            api_token,
            from,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSink for MailRelaySink {
    async fn send(&self, note: Notification) -> anyhow::Result<()> {
        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({
                "from": self.from,
                "to": note.to,
                "subject": note.subject,
                "body": note.body,
            }))
            .send()
            .await
            .context("failed to reach mail relay")?
            .error_for_status()
            .context("mail relay returned error")?;

        Ok(())
    }
}
