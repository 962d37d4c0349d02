//! DynamoDB key generation functions.
//!
//! Pure functions for generating partition and sort keys following the single-table design.
//! All functions are sync and have no side effects.

use leaderboard_core::period::YearAndWeek;

// ============================================================================
// Key attributes and prefixes
// ============================================================================

pub const PK: &str = "pk";
pub const SK: &str = "sk";

pub const VOTE_PREFIX: &str = "vote";
pub const USER_PREFIX: &str = "user";

/// Every tally lives in this one partition.
pub const TALLY_PARTITION: &str = "votes";

// ============================================================================
// Vote ledger keys
// ============================================================================

/// Generate partition key for a week of votes.
///
/// Pattern: `vote<year>W<week>`, e.g. `vote2025W25`
pub fn vote_pk(period: YearAndWeek) -> String {
    format!("{VOTE_PREFIX}{period}")
}

/// Generate sort key for a vote.
///
/// Pattern: `user<voter_id>`
pub fn vote_sk(voter_id: &str) -> String {
    format!("{USER_PREFIX}{voter_id}")
}

/// Parses the week back out of a vote partition key.
pub fn period_from_vote_pk(pk: &str) -> Option<YearAndWeek> {
    pk.strip_prefix(VOTE_PREFIX)?.parse().ok()
}

// ============================================================================
// Tally keys
// ============================================================================

/// Generate partition key for a tally. Constant.
pub fn tally_pk() -> String {
    TALLY_PARTITION.to_string()
}

/// Generate sort key for a tally.
///
/// Pattern: `user<user_id>`
pub fn tally_sk(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

/// Extracts the user id from a `user<id>` sort key.
pub fn user_id_from_sk(sk: &str) -> Option<&str> {
    sk.strip_prefix(USER_PREFIX)
}
