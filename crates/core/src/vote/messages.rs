//! User-visible text.

use super::{Announcement, LeaderboardEntry};

pub const MONTH_CLOSED: &str = "The month has ended! Here are the final results:";
pub const NO_VOTES_THIS_MONTH: &str = "No votes this month.";
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again later.";

/// Reply to an accepted vote.
pub fn vote_confirmation(name: &str, count: u64) -> String {
    let noun = if count == 1 { "vote" } else { "votes" };
    format!("You voted for {name}, they now have {count} {noun}!")
}

/// Builds the period-close announcement from the final leaderboard.
pub fn close_announcement(leaderboard: Vec<LeaderboardEntry>) -> Announcement {
    let content = if leaderboard.is_empty() {
        NO_VOTES_THIS_MONTH
    } else {
        MONTH_CLOSED
    };

    Announcement {
        content: content.to_string(),
        leaderboard,
    }
}

pub fn history_title(name: &str) -> String {
    format!("Votes for {name}")
}

pub fn no_votes_for(name: &str) -> String {
    format!("No votes for {name}")
}
