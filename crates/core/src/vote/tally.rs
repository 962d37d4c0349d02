use chrono::{DateTime, Utc};

use super::UserTally;
use crate::period::{PeriodError, VotingMonth};

/// How a vote changes a votee's tally row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyUpdate {
    /// The row belongs to the active month: add one.
    Increment,
    /// No row, or a row left over from an earlier month: start again at one.
    Reset,
}

/// Decides whether a vote increments or resets the existing tally.
pub fn plan_tally_update(existing: Option<&UserTally>, current: VotingMonth) -> TallyUpdate {
    match existing {
        Some(tally) if tally.is_current(current) => TallyUpdate::Increment,
        _ => TallyUpdate::Reset,
    }
}

/// Computes the tally a vote cast at `now` leaves behind.
///
/// The name is always refreshed to `display_name` and the expiry always
/// follows the active month, even when incrementing.
pub fn next_tally(
    existing: Option<&UserTally>,
    user_id: &str,
    display_name: &str,
    now: DateTime<Utc>,
) -> Result<UserTally, PeriodError> {
    let current = VotingMonth::from_datetime(now);

    let count = match (plan_tally_update(existing, current), existing) {
        (TallyUpdate::Increment, Some(tally)) => tally.count.saturating_add(1),
        _ => 1,
    };

    Ok(UserTally {
        user_id: user_id.to_string(),
        name: display_name.to_string(),
        count,
        voting_period: current,
        expires_at: current.expires_at()?,
    })
}
