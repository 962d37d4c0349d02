use leaderboard_core::storage::{Result, TallyRepository};
use leaderboard_core::vote::{rank_tallies, LeaderboardEntry};

/// Ranked snapshot of every stored tally, at most `limit` entries.
///
/// An empty store yields an empty list.
pub async fn current_leaderboard(
    tallies: &dyn TallyRepository,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>> {
    let rows = tallies.list_tallies().await?;
    tracing::debug!(rows = rows.len(), "Read tally partition");
    Ok(rank_tallies(rows, limit))
}
