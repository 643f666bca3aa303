mod slack;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::{NotificationChannelType, NotificationConfig};

/// Operational events forwarded to the configured channel. Diagnostic only:
/// delivery failures are swallowed and never affect a transfer.
#[derive(Debug, Clone)]
pub enum NotifyEvent {
    Startup {
        started_at: DateTime<Utc>,
    },
    /// A download request failed. Carries the job id and the user-facing
    /// error text; never the share link, whose fragment holds the key.
    DownloadFailed {
        job_id: String,
        error: String,
    },
}

/// Trait for notification channel implementations (Slack, Discord, etc.)
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn notify(&self, event: NotifyEvent) -> Result<()>;
}

/// Factory function to create a notifier based on config
pub fn create_notifier(config: &NotificationConfig) -> Option<Arc<dyn NotificationChannel>> {
    match &config.channel {
        NotificationChannelType::None => None,
        NotificationChannelType::Slack => {
            let webhook = config.slack_webhook.as_ref()?;
            if webhook.is_empty() {
                return None;
            }
            Some(Arc::new(slack::SlackNotifier::new(webhook.clone())))
        }
    }
}
