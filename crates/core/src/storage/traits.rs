use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::period::YearAndWeek;
use crate::vote::{RecordedVote, UserTally};

use super::Result;

/// Repository for the weekly vote ledger.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Returns true if `voter_id` already has a vote recorded for `period`.
    async fn has_voted(&self, voter_id: &str, period: YearAndWeek) -> Result<bool>;

    /// Records a vote. Fails with [`RepositoryError::AlreadyExists`] when the
    /// voter already voted in the vote's period.
    ///
    /// [`RepositoryError::AlreadyExists`]: super::RepositoryError::AlreadyExists
    async fn record_vote(&self, vote: &RecordedVote) -> Result<()>;

    /// Gets every vote cast for `votee_id` in `period`, in no particular order.
    async fn get_votes_for_votee(
        &self,
        period: YearAndWeek,
        votee_id: &str,
    ) -> Result<Vec<RecordedVote>>;
}

/// Repository for monthly vote tallies.
#[async_trait]
pub trait TallyRepository: Send + Sync {
    /// Gets the stored tally for a user, stale or not.
    async fn get_tally(&self, user_id: &str) -> Result<Option<UserTally>>;

    /// Counts one vote for `votee_id` at `now` and returns the updated tally.
    ///
    /// Increments a tally of the current month, resets any other tally to 1.
    /// Concurrent calls for the same votee must not lose increments.
    async fn apply_vote(
        &self,
        votee_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<UserTally>;

    /// Gets all stored tallies, in no particular order.
    async fn list_tallies(&self) -> Result<Vec<UserTally>>;
}
