//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use leaderboard_core::period::YearAndWeek;
use leaderboard_core::storage::{RepositoryError, Result, TallyRepository, VoteRepository};
use leaderboard_core::vote::{next_tally, RecordedVote, UserTally};

/// In-memory storage backend for testing.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    votes: Arc<RwLock<HashMap<(YearAndWeek, String), RecordedVote>>>,
    tallies: Arc<RwLock<HashMap<String, UserTally>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            votes: Arc::new(RwLock::new(HashMap::new())),
            tallies: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Drops every tally whose expiry is at or before `now`, the way the
    /// store's time-to-live sweep would. Returns how many were removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut tallies = self.tallies.write().await;
        let before = tallies.len();
        tallies.retain(|_, tally| !tally.is_expired(now));
        before - tallies.len()
    }
}

#[async_trait]
impl VoteRepository for InMemoryRepository {
    async fn has_voted(&self, voter_id: &str, period: YearAndWeek) -> Result<bool> {
        let votes = self.votes.read().await;
        Ok(votes.contains_key(&(period, voter_id.to_string())))
    }

    async fn record_vote(&self, vote: &RecordedVote) -> Result<()> {
        let mut votes = self.votes.write().await;
        let key = (vote.period, vote.voter_id.clone());
        if votes.contains_key(&key) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "RecordedVote",
                id: format!("{}/{}", vote.period, vote.voter_id),
            });
        }
        votes.insert(key, vote.clone());
        Ok(())
    }

    async fn get_votes_for_votee(
        &self,
        period: YearAndWeek,
        votee_id: &str,
    ) -> Result<Vec<RecordedVote>> {
        let votes = self.votes.read().await;
        Ok(votes
            .values()
            .filter(|v| v.period == period && v.votee_id == votee_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TallyRepository for InMemoryRepository {
    async fn get_tally(&self, user_id: &str) -> Result<Option<UserTally>> {
        let tallies = self.tallies.read().await;
        Ok(tallies.get(user_id).cloned())
    }

    async fn apply_vote(
        &self,
        votee_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<UserTally> {
        // The write lock makes read-and-update one step.
        let mut tallies = self.tallies.write().await;
        let tally = next_tally(tallies.get(votee_id), votee_id, display_name, now)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
        tallies.insert(votee_id.to_string(), tally.clone());
        Ok(tally)
    }

    async fn list_tallies(&self) -> Result<Vec<UserTally>> {
        let tallies = self.tallies.read().await;
        Ok(tallies.values().cloned().collect())
    }
}
