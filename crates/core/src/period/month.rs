use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{PeriodError, MAX_YEAR, MIN_YEAR};

/// Days a tally survives past the end of its month before the store may
/// purge it. Gives the period-close job time to read the final state.
pub const EXPIRY_BUFFER_DAYS: u64 = 1;

/// A calendar month in UTC, the aggregation period of vote tallies.
///
/// Labelled `YYYY-MM` (zero padded), e.g. `2025-06`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VotingMonth {
    year: i32,
    month: u32,
}

impl VotingMonth {
    /// Creates a month, validating the year and month ranges.
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange { year, month });
        }
        Ok(Self { year, month })
    }

    /// Returns the UTC month containing `at`.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.first_day()?
            .checked_add_months(Months::new(1))?
            .pred_opt()
    }

    /// The month before this one.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The month after this one.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Returns true when `at` falls inside this month (UTC).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        Self::from_datetime(at) == *self
    }

    /// Absolute instant after which a tally for this month may be purged:
    /// midnight UTC on the first day of the next month plus the buffer.
    ///
    /// June 2025 expires at `2025-07-02T00:00:00Z`.
    pub fn expires_at(&self) -> Result<DateTime<Utc>, PeriodError> {
        let out_of_range = || PeriodError::MonthOutOfRange {
            year: self.year,
            month: self.month,
        };

        let next_month = self.next();
        let expiry = NaiveDate::from_ymd_opt(next_month.year, next_month.month, 1)
            .and_then(|date| date.checked_add_days(Days::new(EXPIRY_BUFFER_DAYS)))
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(out_of_range)?;

        Ok(expiry.and_utc())
    }
}

/// Expiry instant for a tally written at `at`.
pub fn month_end_expiry(at: DateTime<Utc>) -> Result<DateTime<Utc>, PeriodError> {
    VotingMonth::from_datetime(at).expires_at()
}

impl fmt::Display for VotingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for VotingMonth {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PeriodError::InvalidMonth(s.to_string());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        Self::new(year, month)
    }
}

impl TryFrom<String> for VotingMonth {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VotingMonth> for String {
    fn from(value: VotingMonth) -> Self {
        value.to_string()
    }
}
