//! Application state shared by every command.
//!
//! Holds the repository trait objects and the notification channel, built
//! once from [`Config`] at process start.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use leaderboard_core::period::VotingMonth;
use leaderboard_core::storage::Result;
use leaderboard_core::vote::{LeaderboardEntry, VoteOutcome, VoteRequest};

use crate::config::Config;
use crate::error::{CloseError, ConfigError};
use crate::notify::{LogNotifier, Notifier, WebhookNotifier};
use crate::service::{self, ClosedMonth, VoteHistory};
use crate::storage::{self, Repositories};

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub notifier: Arc<dyn Notifier>,
    pub leaderboard_size: usize,
}

impl AppState {
    pub fn new(repos: Repositories, notifier: Arc<dyn Notifier>, leaderboard_size: usize) -> Self {
        Self {
            repos,
            notifier,
            leaderboard_size,
        }
    }

    /// Connects the configured backend and notification channel.
    pub async fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        let repos = storage::connect(config).await?;

        let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
            Some(url) => Arc::new(
                WebhookNotifier::new(url.clone(), config.store_timeout())
                    .map_err(|e| ConfigError::InvalidWebhook(e.to_string()))?,
            ),
            None => Arc::new(LogNotifier),
        };

        Ok(Self::new(repos, notifier, config.leaderboard_size))
    }

    pub async fn cast_vote(&self, request: &VoteRequest) -> Result<VoteOutcome> {
        service::cast_vote(
            self.repos.votes.as_ref(),
            self.repos.tallies.as_ref(),
            request,
            self.leaderboard_size,
        )
        .await
    }

    pub async fn current_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        service::current_leaderboard(self.repos.tallies.as_ref(), self.leaderboard_size).await
    }

    pub async fn vote_history(
        &self,
        month: VotingMonth,
        user_id: &str,
        name: &str,
    ) -> Result<VoteHistory> {
        service::vote_history(self.repos.votes.as_ref(), month, user_id, name).await
    }

    pub async fn close_month(
        &self,
        now: DateTime<Utc>,
    ) -> std::result::Result<ClosedMonth, CloseError> {
        service::close_month(
            self.repos.tallies.as_ref(),
            self.notifier.as_ref(),
            now,
            self.leaderboard_size,
        )
        .await
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use leaderboard_core::vote::Votee;

    use super::*;
    use crate::storage::InMemoryRepository;

    #[tokio::test]
    async fn test_state_wires_services_together() {
        let state = AppState::new(
            Repositories::shared(InMemoryRepository::new()),
            Arc::new(LogNotifier),
            3,
        );
        let at = DateTime::parse_from_rfc3339("2025-06-16T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);

        for (voter, votee) in [("V1", "A"), ("V2", "B"), ("V3", "C"), ("V4", "D")] {
            let outcome = state
                .cast_vote(&VoteRequest {
                    voter_id: voter.to_string(),
                    target: Some(Votee {
                        id: votee.to_string(),
                        display_name: votee.to_string(),
                    }),
                    channel_id: "chan001".to_string(),
                    message_id: format!("msg-{votee}"),
                    timestamp: at,
                })
                .await
                .unwrap();
            assert!(outcome.is_accepted());
        }

        assert_eq!(state.current_leaderboard().await.unwrap().len(), 3);

        let history = state
            .vote_history(VotingMonth::from_datetime(at), "A", "A")
            .await
            .unwrap();
        assert_eq!(history.total, 1);
    }
}
