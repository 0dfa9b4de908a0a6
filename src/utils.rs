/// Common utility functions.
use crate::{Result, TimespecError};
use chrono::{DateTime, TimeDelta, TimeZone, Timelike, Weekday};

pub(crate) const MINUTES_PER_HOUR: u32 = 60;
pub(crate) const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

/// Combines hours and minutes into minutes since midnight.
///
/// Hours past the end of the day wrap down by 12, so `12pm` is noon and `14pm` stays 14:00.
pub(crate) fn hhmm(hours: u32, minutes: u32) -> u32 {
    let mut hours = hours;
    while hours >= 24 {
        hours -= 12;
    }
    hours * MINUTES_PER_HOUR + minutes
}

/// Week of the month as `day / 7 + 1`: days 1-6 are week 1, 7-13 week 2 and so on.
#[inline]
pub(crate) fn nth_week(day: u32) -> u32 {
    day / 7 + 1
}

/// English ordinal suffix for a number.
pub(crate) fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Lowercase full weekday name.
pub(crate) fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "sunday",
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
    }
}

/// Moves `time` forward by a fixed number of minutes.
#[inline]
pub(crate) fn add_minutes<Tz: TimeZone>(time: &DateTime<Tz>, minutes: u32) -> Result<DateTime<Tz>> {
    time.clone()
        .checked_add_signed(TimeDelta::minutes(minutes as i64))
        .ok_or(TimespecError::TimeOutOfRange)
}

/// Drops seconds and sub-second components.
pub(crate) fn truncate_to_minute<Tz: TimeZone>(time: &DateTime<Tz>) -> Result<DateTime<Tz>> {
    let excess = TimeDelta::seconds(time.second() as i64) + TimeDelta::nanoseconds(time.nanosecond() as i64);
    time.clone()
        .checked_sub_signed(excess)
        .ok_or(TimespecError::TimeOutOfRange)
}

/// Start of the minute-truncated `time`'s hour.
pub(crate) fn start_of_hour<Tz: TimeZone>(time: &DateTime<Tz>) -> Result<DateTime<Tz>> {
    time.clone()
        .checked_sub_signed(TimeDelta::minutes(time.minute() as i64))
        .ok_or(TimespecError::TimeOutOfRange)
}

/// Start of the minute-truncated `time`'s day, measured back by its wall-clock minutes.
pub(crate) fn start_of_day<Tz: TimeZone>(time: &DateTime<Tz>) -> Result<DateTime<Tz>> {
    let minutes = time.hour() * MINUTES_PER_HOUR + time.minute();
    time.clone()
        .checked_sub_signed(TimeDelta::minutes(minutes as i64))
        .ok_or(TimespecError::TimeOutOfRange)
}
