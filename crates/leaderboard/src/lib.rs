//! leaderboard - weekly vote ledger and monthly tallies for chat bots.
//!
//! The pure rules live in `leaderboard_core`. This crate wires them to a
//! store, a notification channel and a command line.

pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod output;
pub mod service;
pub mod state;
pub mod storage;

pub use config::Config;
pub use state::AppState;
