use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{PeriodError, VotingMonth, MAX_YEAR, MIN_YEAR};

/// Separator between the ISO year and the week number in a week label.
pub const WEEK_SEPARATOR: char = 'W';

/// An ISO-8601 week: weeks start on Monday and week 1 is the week holding the
/// year's first Thursday.
///
/// `year` is the ISO week-numbering year, which differs from the calendar
/// year for a few days around January 1st (2021-01-01 is `2020W53`,
/// 2024-12-30 is `2025W1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearAndWeek {
    pub year: i32,
    pub week: u32,
}

impl YearAndWeek {
    /// Creates a week, validating it exists in the given ISO year.
    pub fn new(year: i32, week: u32) -> Result<Self, PeriodError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) || week == 0 || week > weeks_in_iso_year(year) {
            return Err(PeriodError::WeekOutOfRange { year, week });
        }
        Ok(Self { year, week })
    }

    /// Returns the ISO week containing the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Returns the ISO week containing the UTC calendar date of `at`.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self::from_date(at.date_naive())
    }
}

impl fmt::Display for YearAndWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.year, WEEK_SEPARATOR, self.week)
    }
}

impl FromStr for YearAndWeek {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PeriodError::InvalidWeek(s.to_string());

        let (year, week) = s.split_once(WEEK_SEPARATOR).ok_or_else(invalid)?;
        if year.is_empty() || week.is_empty() || week.starts_with('+') {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let week: u32 = week.parse().map_err(|_| invalid())?;

        Self::new(year, week)
    }
}

/// Number of ISO weeks (52 or 53) in the given ISO year.
///
/// December 28th always falls in the last ISO week of its year.
pub fn weeks_in_iso_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 28)
        .map(|date| date.iso_week().week())
        .unwrap_or(52)
}

/// Returns the distinct ISO weeks touching any day of the month, in order.
///
/// The first and last entries usually straddle the neighbouring months.
pub fn weeks_in_month(month: VotingMonth) -> Vec<YearAndWeek> {
    let (Some(first), Some(last)) = (month.first_day(), month.last_day()) else {
        return Vec::new();
    };

    let mut weeks: Vec<YearAndWeek> = Vec::with_capacity(6);
    let mut current = first;
    while current <= last {
        let week = YearAndWeek::from_date(current);
        if weeks.last() != Some(&week) {
            weeks.push(week);
        }
        current += Duration::days(1);
    }

    weeks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn week(year: i32, week: u32) -> YearAndWeek {
        YearAndWeek { year, week }
    }

    #[test]
    fn test_first_thursday_is_week_one() {
        assert_eq!(YearAndWeek::from_date(date(2025, 1, 2)), week(2025, 1));
    }

    #[test]
    fn test_early_january_belongs_to_previous_year() {
        // 2021-01-01 is a Friday, week 1 of 2021 starts on Monday 2021-01-04
        assert_eq!(YearAndWeek::from_date(date(2021, 1, 1)), week(2020, 53));
        assert_eq!(YearAndWeek::from_date(date(2023, 1, 1)), week(2022, 52));
    }

    #[test]
    fn test_late_december_belongs_to_next_year() {
        assert_eq!(YearAndWeek::from_date(date(2024, 12, 30)), week(2025, 1));
    }

    #[test]
    fn test_year_boundaries() {
        let cases = [
            (date(2023, 1, 2), week(2023, 1)),
            (date(2024, 1, 1), week(2024, 1)),
            (date(2026, 1, 1), week(2026, 1)),
            (date(2024, 12, 29), week(2024, 52)),
            (date(2020, 12, 31), week(2020, 53)),
        ];

        for (input, expected) in cases {
            assert_eq!(YearAndWeek::from_date(input), expected, "date {input}");
        }
    }

    #[test]
    fn test_mid_year_week() {
        assert_eq!(YearAndWeek::from_date(date(2025, 6, 16)), week(2025, 25));
    }

    #[test]
    fn test_same_week_for_every_day_monday_to_sunday() {
        let monday = YearAndWeek::from_date(date(2025, 6, 16));
        for day in 16..=22 {
            assert_eq!(YearAndWeek::from_date(date(2025, 6, day)), monday);
        }
        assert_ne!(YearAndWeek::from_date(date(2025, 6, 23)), monday);
    }

    #[test]
    fn test_time_of_day_does_not_matter() {
        let morning = DateTime::parse_from_rfc3339("2025-06-16T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let evening = DateTime::parse_from_rfc3339("2025-06-16T23:59:59Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(YearAndWeek::from_datetime(morning), week(2025, 25));
        assert_eq!(YearAndWeek::from_datetime(evening), week(2025, 25));
    }

    #[test]
    fn test_from_datetime_is_stable() {
        let at = DateTime::parse_from_rfc3339("2025-06-16T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let before = at;

        let first = YearAndWeek::from_datetime(at);
        let second = YearAndWeek::from_datetime(at);

        assert_eq!(first, second);
        assert_eq!(at, before);
    }

    #[test]
    fn test_display_has_no_padding() {
        assert_eq!(week(2025, 1).to_string(), "2025W1");
        assert_eq!(week(2025, 25).to_string(), "2025W25");
        assert_eq!(week(2020, 53).to_string(), "2020W53");
    }

    #[test]
    fn test_parse_round_trip() {
        for period in [week(2025, 1), week(2025, 25), week(2020, 53), week(2026, 1)] {
            assert_eq!(period.to_string().parse::<YearAndWeek>().unwrap(), period);
        }
    }

    #[test]
    fn test_parse_rejects_malformed_labels() {
        for input in ["", "2025", "2025W", "W25", "2025-25", "2025Wx", "2025W+3", "abcdW1"] {
            assert!(
                matches!(input.parse::<YearAndWeek>(), Err(PeriodError::InvalidWeek(_))),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_week_outside_year() {
        assert_eq!(
            "2024W53".parse::<YearAndWeek>(),
            Err(PeriodError::WeekOutOfRange {
                year: 2024,
                week: 53
            })
        );
        assert!("2025W0".parse::<YearAndWeek>().is_err());
        assert!("2020W53".parse::<YearAndWeek>().is_ok());
    }

    #[test]
    fn test_weeks_in_iso_year() {
        assert_eq!(weeks_in_iso_year(2020), 53);
        assert_eq!(weeks_in_iso_year(2024), 52);
        assert_eq!(weeks_in_iso_year(2026), 53);
    }

    #[test]
    fn test_weeks_in_month_june_2025() {
        let month = VotingMonth::new(2025, 6).unwrap();
        // June 1st 2025 is a Sunday, June 30th a Monday
        assert_eq!(
            weeks_in_month(month),
            vec![
                week(2025, 22),
                week(2025, 23),
                week(2025, 24),
                week(2025, 25),
                week(2025, 26),
                week(2025, 27),
            ]
        );
    }

    #[test]
    fn test_weeks_in_month_crossing_iso_year() {
        let month = VotingMonth::new(2021, 1).unwrap();
        let weeks = weeks_in_month(month);

        assert_eq!(weeks.first(), Some(&week(2020, 53)));
        assert_eq!(weeks.last(), Some(&week(2021, 4)));
        assert_eq!(weeks.len(), 5);
    }
}
