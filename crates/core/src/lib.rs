//! Functional core of the leaderboard vote bot.
//!
//! Everything in this crate is pure: period arithmetic, the vote and tally
//! domain types, ranking and grouping rules, and the repository traits the
//! storage backends implement. I/O lives in the `leaderboard` crate.

pub mod period;
pub mod storage;
pub mod vote;
