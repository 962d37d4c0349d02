use chrono::{DateTime, Utc};
use serde::Serialize;

use leaderboard_core::period::VotingMonth;
use leaderboard_core::storage::TallyRepository;
use leaderboard_core::vote::{messages, Announcement};

use super::current_leaderboard;
use crate::error::CloseError;
use crate::notify::Notifier;

/// Result of a period-close run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedMonth {
    pub month: VotingMonth,
    pub announcement: Announcement,
}

/// Announces the final leaderboard of the month before `now`.
///
/// Reads the leaderboard once and never deletes anything: stale tallies are
/// reset by the next vote and purged by the store's expiry.
pub async fn close_month(
    tallies: &dyn TallyRepository,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
    leaderboard_size: usize,
) -> Result<ClosedMonth, CloseError> {
    let month = VotingMonth::from_datetime(now).previous();
    let leaderboard = current_leaderboard(tallies, leaderboard_size).await?;

    if leaderboard.is_empty() {
        tracing::warn!(
            month = %month,
            "Leaderboard is empty at month close, tallies may already have expired"
        );
    }

    let announcement = messages::close_announcement(leaderboard);
    notifier.announce(&announcement).await?;

    tracing::info!(
        month = %month,
        entries = announcement.leaderboard.len(),
        "Month closed"
    );

    Ok(ClosedMonth {
        month,
        announcement,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use leaderboard_core::vote::LEADERBOARD_LIMIT;

    use super::*;
    use crate::error::NotifyError;
    use crate::storage::inmemory::InMemoryRepository;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[derive(Default, Clone)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<Announcement>>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn announce(&self, announcement: &Announcement) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(announcement.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_close_announces_final_results() {
        let repo = InMemoryRepository::new();
        repo.apply_vote("A", "Alice", utc("2025-06-10T10:00:00Z")).await.unwrap();
        repo.apply_vote("A", "Alice", utc("2025-06-11T10:00:00Z")).await.unwrap();
        repo.apply_vote("B", "Bob", utc("2025-06-12T10:00:00Z")).await.unwrap();
        let notifier = RecordingNotifier::default();

        let closed = close_month(&repo, &notifier, utc("2025-07-01T00:00:00Z"), LEADERBOARD_LIMIT)
            .await
            .unwrap();

        assert_eq!(closed.month.to_string(), "2025-06");
        assert_eq!(
            closed.announcement.content,
            "The month has ended! Here are the final results:"
        );
        assert_eq!(closed.announcement.leaderboard[0].name, "Alice");
        assert_eq!(closed.announcement.leaderboard[0].count, 2);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], closed.announcement);
    }

    #[tokio::test]
    async fn test_close_does_not_delete() {
        let repo = InMemoryRepository::new();
        repo.apply_vote("A", "Alice", utc("2025-06-10T10:00:00Z")).await.unwrap();

        close_month(&repo, &RecordingNotifier::default(), utc("2025-07-01T00:00:00Z"), 24)
            .await
            .unwrap();

        assert_eq!(repo.list_tallies().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_close_after_expiry_reads_empty_leaderboard() {
        let repo = InMemoryRepository::new();
        repo.apply_vote("A", "Alice", utc("2025-06-10T10:00:00Z")).await.unwrap();
        // The close job ran late, after the one-day buffer
        repo.purge_expired(utc("2025-07-02T00:00:00Z")).await;
        let notifier = RecordingNotifier::default();

        let closed = close_month(&repo, &notifier, utc("2025-07-02T06:00:00Z"), LEADERBOARD_LIMIT)
            .await
            .unwrap();

        assert_eq!(closed.announcement.content, "No votes this month.");
        assert!(closed.announcement.leaderboard.is_empty());
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_close_in_january_reports_december() {
        let repo = InMemoryRepository::new();
        let closed = close_month(
            &repo,
            &RecordingNotifier::default(),
            utc("2026-01-01T00:05:00Z"),
            LEADERBOARD_LIMIT,
        )
        .await
        .unwrap();

        assert_eq!(closed.month.to_string(), "2025-12");
    }
}
