//! Vote domain: ledger facts, tallies and the pure rules around them.

mod history;
mod leaderboard;
pub mod messages;
mod tally;
mod types;

pub use history::{filter_votes_to_month, group_votes_by_message, vote_count_label};
pub use leaderboard::{format_leaderboard, rank_tallies, LEADERBOARD_LIMIT};
pub use tally::{next_tally, plan_tally_update, TallyUpdate};
pub use types::{
    Announcement, LeaderboardEntry, RecordedVote, Rejection, UserTally, VoteMessageGroup,
    VoteOutcome, VoteReceipt, VoteRequest, Votee,
};
