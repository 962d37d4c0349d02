use thiserror::Error;

/// Errors that can occur when parsing or constructing a period.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid week period: {0} (expected YYYYWn)")]
    InvalidWeek(String),
    #[error("Week {week} does not exist in ISO year {year}")]
    WeekOutOfRange { year: i32, week: u32 },
    #[error("Invalid month period: {0} (expected YYYY-MM)")]
    InvalidMonth(String),
    #[error("Month {month} of year {year} is out of range")]
    MonthOutOfRange { year: i32, month: u32 },
}
