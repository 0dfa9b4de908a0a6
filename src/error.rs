use thiserror::Error;

/// Crate specific Errors implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimespecError {
    /// Schedule phrase doesn't match the recurrence grammar.
    #[error("invalid schedule `{schedule}`: {reason}")]
    InvalidSchedule {
        /// The phrase as it was provided.
        schedule: String,
        /// What the parser expected or stumbled over.
        reason: String,
    },
    /// Numeric literal can't be represented.
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    /// Schedule file can't be read.
    #[error("unable to read schedule from {path}: {reason}")]
    UnreadableFile {
        /// Path of the file.
        path: String,
        /// Underlying I/O error message.
        reason: String,
    },
    /// Time of day is beyond the last minute of a day.
    #[error("invalid time of day: {0} minutes past midnight")]
    InvalidTimeOfDay(u32),
    /// Minute of hour is beyond 59.
    #[error("invalid minute of hour: {0}")]
    InvalidMinuteOfHour(u32),
    /// Nth week of the month is out of 1-5.
    #[error("invalid week of month: {0}")]
    InvalidWeek(u32),
    /// Day of the month is out of 1-31.
    #[error("invalid day of month: {0}")]
    InvalidDayOfMonth(u32),
    /// Monthly schedule has neither nth week nor day of month.
    #[error("unhandled interval: monthly schedule without week or day of month")]
    UnhandledInterval,
    /// Monthly schedule has both nth week and day of month.
    #[error("monthly schedule has both week ({week}) and day of month ({day_of_month})")]
    ConflictingMonthlySelectors {
        /// Nth week of the month.
        week: u32,
        /// Day of the month.
        day_of_month: u32,
    },
    /// Calculated time doesn't fit into the supported range.
    #[error("calculated time is out of range")]
    TimeOutOfRange,
    /// Unknown timezone in the `TZ=` prefix.
    #[cfg(feature = "tz")]
    #[error("invalid timezone: {0}")]
    InvalidTimeZone(String),
}
