use leaderboard_core::storage::{RepositoryError, Result, TallyRepository, VoteRepository};
use leaderboard_core::vote::{
    messages, Rejection, VoteOutcome, VoteReceipt, VoteRequest,
};

use super::current_leaderboard;

/// Casts a vote: validates it, records it in the weekly ledger, counts it in
/// the votee's monthly tally and returns the fresh leaderboard.
///
/// Rejections come back as [`VoteOutcome::Rejected`]. Only store failures
/// are errors. The ledger is written before the tally, so a failure in
/// between leaves a recorded vote without its count.
pub async fn cast_vote(
    votes: &dyn VoteRepository,
    tallies: &dyn TallyRepository,
    request: &VoteRequest,
    leaderboard_size: usize,
) -> Result<VoteOutcome> {
    let votee = match request.validate() {
        Ok(votee) => votee,
        Err(reason) => return Ok(rejected(request, reason)),
    };

    let period = request.period();
    if votes.has_voted(&request.voter_id, period).await? {
        return Ok(rejected(request, Rejection::AlreadyVoted));
    }

    // has_voted is only a fast path, the conditional write decides
    match votes.record_vote(&request.to_recorded_vote(votee)).await {
        Ok(()) => {}
        Err(RepositoryError::AlreadyExists { .. }) => {
            return Ok(rejected(request, Rejection::AlreadyVoted));
        }
        Err(err) => {
            tracing::error!(error = %err, voter_id = %request.voter_id, "Failed to record vote");
            return Err(err);
        }
    }

    let tally = tallies
        .apply_vote(&votee.id, &votee.display_name, request.timestamp)
        .await
        .inspect_err(|err| {
            tracing::error!(error = %err, votee_id = %votee.id, "Vote recorded but tally not updated");
        })?;

    tracing::info!(
        period = %period,
        voter_id = %request.voter_id,
        votee_id = %votee.id,
        count = tally.count,
        voting_period = %tally.voting_period,
        "Vote accepted"
    );

    let leaderboard = current_leaderboard(tallies, leaderboard_size).await?;

    Ok(VoteOutcome::Accepted(VoteReceipt {
        content: messages::vote_confirmation(&tally.name, tally.count),
        tally,
        leaderboard,
    }))
}

fn rejected(request: &VoteRequest, reason: Rejection) -> VoteOutcome {
    tracing::warn!(
        voter_id = %request.voter_id,
        message_id = %request.message_id,
        reason = ?reason,
        "Vote rejected"
    );
    VoteOutcome::Rejected { reason }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use leaderboard_core::period::YearAndWeek;
    use leaderboard_core::vote::{LeaderboardEntry, RecordedVote, Votee, LEADERBOARD_LIMIT};

    use super::*;
    use crate::storage::inmemory::InMemoryRepository;

    fn request(voter: &str, votee: Option<(&str, &str)>, at: &str) -> VoteRequest {
        VoteRequest {
            voter_id: voter.to_string(),
            target: votee.map(|(id, name)| Votee {
                id: id.to_string(),
                display_name: name.to_string(),
            }),
            channel_id: "chan001".to_string(),
            message_id: "msg789".to_string(),
            timestamp: DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc),
        }
    }

    async fn cast(repo: &InMemoryRepository, req: &VoteRequest) -> VoteOutcome {
        cast_vote(repo, repo, req, LEADERBOARD_LIMIT).await.unwrap()
    }

    /// Ledger whose pre-check never sees existing votes, as when two requests
    /// from one voter race.
    struct RacingLedger(InMemoryRepository);

    #[async_trait]
    impl VoteRepository for RacingLedger {
        async fn has_voted(&self, _voter_id: &str, _period: YearAndWeek) -> Result<bool> {
            Ok(false)
        }

        async fn record_vote(&self, vote: &RecordedVote) -> Result<()> {
            self.0.record_vote(vote).await
        }

        async fn get_votes_for_votee(
            &self,
            period: YearAndWeek,
            votee_id: &str,
        ) -> Result<Vec<RecordedVote>> {
            self.0.get_votes_for_votee(period, votee_id).await
        }
    }

    #[tokio::test]
    async fn test_first_vote_of_the_week() {
        let repo = InMemoryRepository::new();

        let outcome = cast(&repo, &request("V1", Some(("A", "Alice")), "2025-06-16T10:30:00Z")).await;

        let VoteOutcome::Accepted(receipt) = outcome else {
            panic!("vote should be accepted");
        };
        assert_eq!(receipt.content, "You voted for Alice, they now have 1 vote!");
        assert_eq!(receipt.tally.count, 1);
        assert_eq!(receipt.tally.name, "Alice");
        assert_eq!(
            receipt.leaderboard,
            vec![LeaderboardEntry {
                name: "Alice".to_string(),
                count: 1
            }]
        );
        assert!(repo
            .has_voted("V1", YearAndWeek { year: 2025, week: 25 })
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_second_voter_increments() {
        let repo = InMemoryRepository::new();
        cast(&repo, &request("V1", Some(("A", "Alice")), "2025-06-16T10:30:00Z")).await;

        let outcome = cast(&repo, &request("V2", Some(("A", "Alice")), "2025-06-17T09:00:00Z")).await;

        assert_eq!(outcome.content(), "You voted for Alice, they now have 2 votes!");
    }

    #[tokio::test]
    async fn test_missing_target() {
        let repo = InMemoryRepository::new();

        let outcome = cast(&repo, &request("V1", None, "2025-06-16T10:30:00Z")).await;

        assert_eq!(
            outcome,
            VoteOutcome::Rejected {
                reason: Rejection::TargetNotFound
            }
        );
        assert_eq!(outcome.content(), "No messages found :(");
    }

    #[tokio::test]
    async fn test_self_vote_touches_nothing() {
        let repo = InMemoryRepository::new();

        let outcome = cast(&repo, &request("V1", Some(("V1", "Me")), "2025-06-16T10:30:00Z")).await;

        assert_eq!(outcome.content(), "You cannot vote for yourself");
        assert!(!repo
            .has_voted("V1", YearAndWeek { year: 2025, week: 25 })
            .await
            .unwrap());
        assert!(repo.list_tallies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_vote_in_same_week_is_rejected() {
        let repo = InMemoryRepository::new();
        cast(&repo, &request("V1", Some(("A", "Alice")), "2025-06-16T10:30:00Z")).await;

        let outcome = cast(&repo, &request("V1", Some(("B", "Bob")), "2025-06-22T20:00:00Z")).await;

        assert_eq!(outcome.content(), "You have already voted this week");
        assert_eq!(repo.get_tally("B").await.unwrap(), None);
        assert_eq!(repo.get_tally("A").await.unwrap().unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_vote_again_next_week() {
        let repo = InMemoryRepository::new();
        cast(&repo, &request("V1", Some(("A", "Alice")), "2025-06-16T10:30:00Z")).await;

        let outcome = cast(&repo, &request("V1", Some(("A", "Alice")), "2025-06-23T10:30:00Z")).await;

        assert!(outcome.is_accepted());
        assert_eq!(repo.get_tally("A").await.unwrap().unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_racing_duplicate_is_rejected_by_conditional_write() {
        let repo = InMemoryRepository::new();
        let ledger = RacingLedger(repo.clone());
        let first = request("V1", Some(("A", "Alice")), "2025-06-16T10:30:00Z");
        let second = request("V1", Some(("A", "Alice")), "2025-06-16T10:30:01Z");

        let outcome = cast_vote(&ledger, &repo, &first, LEADERBOARD_LIMIT).await.unwrap();
        assert!(outcome.is_accepted());

        let outcome = cast_vote(&ledger, &repo, &second, LEADERBOARD_LIMIT).await.unwrap();
        assert_eq!(
            outcome,
            VoteOutcome::Rejected {
                reason: Rejection::AlreadyVoted
            }
        );
        assert_eq!(repo.get_tally("A").await.unwrap().unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_new_month_resets_tally() {
        let repo = InMemoryRepository::new();
        for (voter, at) in [
            ("V1", "2025-05-05T10:00:00Z"),
            ("V2", "2025-05-06T10:00:00Z"),
            ("V3", "2025-05-07T10:00:00Z"),
        ] {
            cast(&repo, &request(voter, Some(("A", "Alice")), at)).await;
        }

        let outcome = cast(&repo, &request("V1", Some(("A", "Alice")), "2025-06-02T10:00:00Z")).await;

        assert_eq!(outcome.content(), "You voted for Alice, they now have 1 vote!");
    }
}
