use serde::Serialize;

use leaderboard_core::period::{weeks_in_month, VotingMonth, YearAndWeek};
use leaderboard_core::storage::{Result, VoteRepository};
use leaderboard_core::vote::{
    filter_votes_to_month, group_votes_by_message, RecordedVote, VoteMessageGroup,
};

/// Every vote `user_id` received in the given weeks, concatenated in period
/// order. Weeks are disjoint so nothing is deduplicated.
pub async fn votes_for_user_across_periods(
    votes: &dyn VoteRepository,
    periods: &[YearAndWeek],
    user_id: &str,
) -> Result<Vec<RecordedVote>> {
    let mut found = Vec::new();
    for period in periods {
        let batch = votes.get_votes_for_votee(*period, user_id).await?;
        tracing::debug!(period = %period, user_id, votes = batch.len(), "Read vote partition");
        found.extend(batch);
    }
    Ok(found)
}

/// Votes `user_id` received during `month`.
pub async fn votes_for_user_in_month(
    votes: &dyn VoteRepository,
    month: VotingMonth,
    user_id: &str,
) -> Result<Vec<RecordedVote>> {
    let weeks = weeks_in_month(month);
    let found = votes_for_user_across_periods(votes, &weeks, user_id).await?;
    Ok(filter_votes_to_month(found, month))
}

/// A user's votes of one month, grouped by the message that earned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteHistory {
    pub user_id: String,
    pub name: String,
    pub month: VotingMonth,
    pub total: usize,
    pub groups: Vec<VoteMessageGroup>,
}

pub async fn vote_history(
    votes: &dyn VoteRepository,
    month: VotingMonth,
    user_id: &str,
    name: &str,
) -> Result<VoteHistory> {
    let found = votes_for_user_in_month(votes, month, user_id).await?;
    Ok(VoteHistory {
        user_id: user_id.to_string(),
        name: name.to_string(),
        month,
        total: found.len(),
        groups: group_votes_by_message(&found),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::storage::inmemory::InMemoryRepository;

    async fn record(repo: &InMemoryRepository, voter: &str, votee: &str, message: &str, at: &str) {
        let voted_at = DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc);
        repo.record_vote(&RecordedVote {
            period: YearAndWeek::from_datetime(voted_at),
            voter_id: voter.to_string(),
            votee_id: votee.to_string(),
            channel_id: "chan001".to_string(),
            message_id: message.to_string(),
            voted_at,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_across_periods_concatenates() {
        let repo = InMemoryRepository::new();
        record(&repo, "V1", "A", "m1", "2025-06-16T10:00:00Z").await;
        record(&repo, "V1", "A", "m2", "2025-06-23T10:00:00Z").await;
        record(&repo, "V2", "B", "m3", "2025-06-23T10:00:00Z").await;

        let periods = [
            YearAndWeek { year: 2025, week: 25 },
            YearAndWeek { year: 2025, week: 26 },
        ];
        let found = votes_for_user_across_periods(&repo, &periods, "A")
            .await
            .unwrap();

        let messages: Vec<&str> = found.iter().map(|v| v.message_id.as_str()).collect();
        assert_eq!(messages, vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn test_in_month_drops_straddling_days() {
        let repo = InMemoryRepository::new();
        // 2025W22 runs from Monday May 26th to Sunday June 1st
        record(&repo, "V1", "A", "m1", "2025-05-27T10:00:00Z").await;
        record(&repo, "V2", "A", "m2", "2025-06-01T10:00:00Z").await;
        // 2025W27 runs from Monday June 30th to Sunday July 6th
        record(&repo, "V3", "A", "m3", "2025-06-30T10:00:00Z").await;
        record(&repo, "V4", "A", "m4", "2025-07-02T10:00:00Z").await;

        let june = VotingMonth::new(2025, 6).unwrap();
        let mut messages: Vec<String> = votes_for_user_in_month(&repo, june, "A")
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.message_id)
            .collect();
        messages.sort();

        assert_eq!(messages, vec!["m2", "m3"]);
    }

    #[tokio::test]
    async fn test_vote_history_groups_messages() {
        let repo = InMemoryRepository::new();
        record(&repo, "V1", "A", "m1", "2025-06-16T10:00:00Z").await;
        record(&repo, "V2", "A", "m1", "2025-06-17T10:00:00Z").await;
        record(&repo, "V3", "A", "m2", "2025-06-18T10:00:00Z").await;

        let june = VotingMonth::new(2025, 6).unwrap();
        let history = vote_history(&repo, june, "A", "Alice").await.unwrap();

        assert_eq!(history.total, 3);
        assert_eq!(history.groups.len(), 2);
        assert_eq!(history.groups[0].message_id, "m1");
        assert_eq!(history.groups[0].count, 2);
    }

    #[tokio::test]
    async fn test_vote_history_empty() {
        let repo = InMemoryRepository::new();
        let june = VotingMonth::new(2025, 6).unwrap();

        let history = vote_history(&repo, june, "A", "Alice").await.unwrap();

        assert_eq!(history.total, 0);
        assert!(history.groups.is_empty());
    }
}
