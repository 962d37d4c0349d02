//! Output formatting functions.

pub mod json;
pub mod pretty;

use chrono::{DateTime, Utc};
use serde::Serialize;

use leaderboard_core::period::{PeriodError, VotingMonth, YearAndWeek};
use leaderboard_core::storage::{repository_error_to_user_message, RepositoryError};

use crate::cli::OutputFormat;

/// Format a value for output.
pub fn format_output<T: Serialize>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_json(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Writes the user-facing sentence for a store failure to `out`.
///
/// The error detail only goes to the log.
pub fn report_store_error(
    error: &RepositoryError,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    tracing::error!(error = %error, "Store call failed");
    writeln!(out, "{}", repository_error_to_user_message(error))
}

/// The periods an instant falls into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub at: DateTime<Utc>,
    pub week: YearAndWeek,
    pub week_label: String,
    pub month: VotingMonth,
    pub tally_expires_at: DateTime<Utc>,
}

impl PeriodReport {
    pub fn at(at: DateTime<Utc>) -> Result<Self, PeriodError> {
        let week = YearAndWeek::from_datetime(at);
        let month = VotingMonth::from_datetime(at);
        Ok(Self {
            at,
            week,
            week_label: week.to_string(),
            month,
            tally_expires_at: month.expires_at()?,
        })
    }
}
