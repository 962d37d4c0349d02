//! Outbound notification channel for period-close announcements.

use std::time::Duration;

use async_trait::async_trait;
use leaderboard_core::vote::{format_leaderboard, Announcement};

use crate::error::NotifyError;

/// Delivers announcements somewhere people will read them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn announce(&self, announcement: &Announcement) -> Result<(), NotifyError>;
}

/// Writes announcements to the log. Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn announce(&self, announcement: &Announcement) -> Result<(), NotifyError> {
        tracing::info!(
            entries = announcement.leaderboard.len(),
            "{}",
            announcement.content
        );
        for line in format_leaderboard(&announcement.leaderboard) {
            tracing::info!("{line}");
        }
        Ok(())
    }
}

/// POSTs announcements as JSON (`{"content": .., "leaderboard": [..]}`).
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn announce(&self, announcement: &Announcement) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(announcement)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(status = status.as_u16(), "Announcement delivered");
            return Ok(());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leaderboard_core::vote::LeaderboardEntry;

    fn announcement() -> Announcement {
        Announcement {
            content: "The month has ended! Here are the final results:".to_string(),
            leaderboard: vec![LeaderboardEntry {
                name: "Alice".to_string(),
                count: 3,
            }],
        }
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        LogNotifier.announce(&announcement()).await.unwrap();
    }

    #[tokio::test]
    async fn test_webhook_unreachable_endpoint() {
        // Nothing listens on the discard port of the loopback interface
        let notifier =
            WebhookNotifier::new("http://127.0.0.1:9/hook", Duration::from_secs(2)).unwrap();

        let result = notifier.announce(&announcement()).await;
        assert!(matches!(result, Err(NotifyError::Request(_))));
    }

    #[test]
    fn test_webhook_payload_shape() {
        let json = serde_json::to_value(announcement()).unwrap();

        assert_eq!(
            json["content"],
            "The month has ended! Here are the final results:"
        );
        assert_eq!(json["leaderboard"][0]["name"], "Alice");
        assert_eq!(json["leaderboard"][0]["count"], 3);
    }
}
