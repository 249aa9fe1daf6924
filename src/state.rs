use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::notifications::{Notification, NotificationSink};

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub notifications: Box<dyn NotificationSink>,
}

impl AppState {
    /// Fire-and-forget email dispatch: a failed send is logged and never
    /// surfaces to the caller.
    pub async fn notify(&self, note: Notification) {
        if let Err(e) = self.notifications.send(note).await {
            tracing::warn!(error = %e, "failed to send notification email");
        }
    }
}
