use crate::{
    spec::{Interval, Spec},
    utils::{self, MINUTES_PER_DAY},
    Result, TimespecError,
};
use chrono::{DateTime, TimeDelta, TimeZone};
#[cfg(feature = "tz")]
use chrono_tz::Tz;
use std::{fmt::Display, str::FromStr};

/// Validated recurring schedule, ready to produce event times.
///
/// For the accepted phrases and usage examples, please refer to the [crate documentation](crate).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String"))]
#[cfg_attr(feature = "serde", serde(into = "String"))]
pub struct Schedule {
    spec: Spec,
    #[cfg(feature = "tz")]
    tz: Option<Tz>,
}

impl Schedule {
    /// Parses and validates provided `pattern` and constructs [`Schedule`] instance.
    ///
    /// Alternative way to construct [`Schedule`] is to use one of `try_from` or `from_str` methods.
    ///
    /// Returns [`TimespecError`] in a case provided pattern is unparsable,
    /// or it parses into a spec with out of range values, like `monthly on the 40th`.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();

        #[cfg(feature = "tz")]
        let (tz, phrase) = split_timezone(&pattern)?;
        #[cfg(not(feature = "tz"))]
        let phrase = pattern.as_str();

        let spec = crate::parse(phrase)?;
        spec.validate()?;

        Ok(Self {
            spec,
            #[cfg(feature = "tz")]
            tz,
        })
    }

    /// Underlying schedule spec.
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Recurrence granularity.
    pub fn interval(&self) -> Interval {
        self.spec.interval
    }

    /// Timezone the schedule is bound to, if any.
    #[cfg(feature = "tz")]
    pub fn timezone(&self) -> Option<Tz> {
        self.tz
    }

    /// Return time of the upcoming event, starting from the provided `current` value.
    ///
    /// Same as [`Spec::next`], except that the result is never before `current` truncated to the minute:
    /// a weekly event which has already passed today is moved to the next week.
    ///
    /// If `tz` feature isn't enabled,
    /// this method assumes that schedule timezone is the same as timezone of the provided `current` instance.
    ///
    /// If `tz` feature is enabled and [schedule uses timezone](crate#schedule-with-timezone),
    /// then method calculates time of the upcoming event with respect to the schedule's timezone:
    /// - converts `current` into schedule timezone;
    /// - calculates upcoming event time;
    /// - converts obtained upcoming value back to the timezone of the `current` instance.
    ///
    /// Returns `None` if the upcoming event is beyond the supported time range.
    #[cfg(not(feature = "tz"))]
    #[inline]
    pub fn upcoming<T: TimeZone>(&self, current: &DateTime<T>) -> Option<DateTime<T>> {
        self.upcoming_impl(current)
    }

    /// Doc is above.
    #[cfg(feature = "tz")]
    pub fn upcoming<T: TimeZone>(&self, current: &DateTime<T>) -> Option<DateTime<T>> {
        if let Some(schedule_tz) = &self.tz {
            let current_tz = current.timezone();
            let current = current.with_timezone(schedule_tz);
            let result = self.upcoming_impl(&current);
            result.map(|dt| dt.with_timezone(&current_tz))
        } else {
            self.upcoming_impl(current)
        }
    }

    fn upcoming_impl<T: TimeZone>(&self, current: &DateTime<T>) -> Option<DateTime<T>> {
        let floor = utils::truncate_to_minute(current).ok()?;
        let next = self.spec.next(current).ok()?;
        if next >= floor {
            return Some(next);
        }

        log::debug!("`{}`: {next:?} has already passed, looking from the following day", self.spec);
        let following_day = utils::add_minutes(&next, MINUTES_PER_DAY).ok()?;
        self.spec.next(&following_day).ok()
    }

    /// Returns iterator of events starting from `current`.
    #[inline]
    pub fn iter<T: TimeZone>(&self, current: &DateTime<T>) -> impl Iterator<Item = DateTime<T>> {
        ScheduleIterator {
            schedule: self.clone(),
            next: self.upcoming(current),
        }
    }

    /// Consumes [`Schedule`] and returns iterator of events starting from `current`.
    #[inline]
    pub fn into_iter<T: TimeZone>(self, current: &DateTime<T>) -> impl Iterator<Item = DateTime<T>> {
        let next = self.upcoming(current);
        ScheduleIterator { schedule: self, next }
    }
}

/// Splits optional `TZ=<name>` prefix off the schedule phrase.
#[cfg(feature = "tz")]
fn split_timezone(pattern: &str) -> Result<(Option<Tz>, &str)> {
    let pattern = pattern.trim_start();
    let (first, rest) = pattern.split_once(char::is_whitespace).unwrap_or((pattern, ""));

    match first.split_once('=') {
        Some((key, name)) if key.eq_ignore_ascii_case("TZ") => {
            let tz = Tz::from_str(name).map_err(|_| TimespecError::InvalidTimeZone(name.to_owned()))?;
            Ok((Some(tz), rest))
        }
        _ => Ok((None, pattern)),
    }
}

/// Contains iterator state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScheduleIterator<T: TimeZone> {
    schedule: Schedule,
    next: Option<DateTime<T>>,
}

impl<T: TimeZone> Iterator for ScheduleIterator<T> {
    type Item = DateTime<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self
            .schedule
            .upcoming(&current.clone().checked_add_signed(TimeDelta::minutes(1))?);
        Some(current)
    }
}

impl From<Schedule> for String {
    fn from(value: Schedule) -> Self {
        value.to_string()
    }
}

impl From<&Schedule> for String {
    fn from(value: &Schedule) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Schedule {
    type Error = TimespecError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&String> for Schedule {
    type Error = TimespecError;

    fn try_from(value: &String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Schedule {
    type Error = TimespecError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl FromStr for Schedule {
    type Err = TimespecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        #[cfg(feature = "tz")]
        if let Some(tz) = self.tz {
            return write!(f, "TZ={} {}", tz, self.spec);
        }

        write!(f, "{}", self.spec)
    }
}
