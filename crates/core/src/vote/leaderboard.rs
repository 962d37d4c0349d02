use std::cmp::Ordering;

use super::{LeaderboardEntry, UserTally};

/// Maximum number of entries a leaderboard shows.
pub const LEADERBOARD_LIMIT: usize = 24;

/// Orders tallies by count descending and keeps the first `limit`
/// (never more than [`LEADERBOARD_LIMIT`]).
///
/// Equal counts are ordered by name, then by user id, so the output does not
/// depend on the order the store returned rows in.
pub fn rank_tallies(mut tallies: Vec<UserTally>, limit: usize) -> Vec<LeaderboardEntry> {
    tallies.sort_by(compare_tallies);
    tallies
        .iter()
        .take(limit.min(LEADERBOARD_LIMIT))
        .map(LeaderboardEntry::from)
        .collect()
}

fn compare_tallies(a: &UserTally, b: &UserTally) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Renders one line per entry as `"{rank}. {name}: {count}"`.
pub fn format_leaderboard(entries: &[LeaderboardEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {}: {}", i + 1, entry.name, entry.count))
        .collect()
}
