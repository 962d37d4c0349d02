//! Period calculator.
//!
//! Maps instants to the two recurring periods the bot works with:
//!
//! - [`YearAndWeek`]: the ISO-8601 week, used to bucket individual votes so a
//!   voter gets one vote per week.
//! - [`VotingMonth`]: the UTC calendar month, used to aggregate tallies and to
//!   compute when a tally may expire.
//!
//! All functions are pure and deterministic for a given input.

mod error;
mod month;
mod week;

pub use error::PeriodError;
pub use month::{month_end_expiry, VotingMonth, EXPIRY_BUFFER_DAYS};
pub use week::{weeks_in_iso_year, weeks_in_month, YearAndWeek, WEEK_SEPARATOR};

/// Supported year range. Month labels are always four digit years.
pub(crate) const MIN_YEAR: i32 = 1;
pub(crate) const MAX_YEAR: i32 = 9999;
