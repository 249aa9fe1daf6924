pub mod email;

use async_trait::async_trait;

/// A single outbound email notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, note: Notification) -> anyhow::Result<()>;
}

/// Fallback sink for local runs without a mail relay configured.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, note: Notification) -> anyhow::Result<()> {
        tracing::info!(
            to = ?note.to,
            subject = %note.subject,
            "email notification (mail relay not configured)"
        );
        Ok(())
    }
}
