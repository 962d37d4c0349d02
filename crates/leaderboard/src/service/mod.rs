//! Vote, reader and period-close operations over the repository traits.

mod close;
mod history;
mod leaderboard;
mod vote;

pub use close::{close_month, ClosedMonth};
pub use history::{
    vote_history, votes_for_user_across_periods, votes_for_user_in_month, VoteHistory,
};
pub use leaderboard::current_leaderboard;
pub use vote::cast_vote;
