use crate::{
    utils::{self, MINUTES_PER_DAY, MINUTES_PER_HOUR},
    Result, TimespecError,
};
use chrono::{DateTime, Datelike, TimeZone, Weekday};
use std::fmt::Display;

/// Recurrence granularity of a [`Spec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Interval {
    /// Once an hour, at [`Spec::time_of_hour`].
    Hourly,
    /// Once a day, at [`Spec::time_of_day`].
    Daily,
    /// Once a week, on [`Spec::day_of_week`].
    Weekly,
    /// Once a month, either on [`Spec::day_of_month`] or on the [`Spec::week`]-th [`Spec::day_of_week`].
    Monthly,
}

impl Interval {
    /// How many runs of this interval fit into `days`.
    ///
    /// Months are counted as 30 days. Hourly counts saturate at `u32::MAX`.
    pub fn runs_in_days(&self, days: u32) -> u32 {
        match self {
            Interval::Hourly => days.saturating_mul(24),
            Interval::Daily => days,
            Interval::Weekly => days / 7,
            Interval::Monthly => days / 30,
        }
    }
}

/// Parsed recurring schedule.
///
/// Usually produced by [`parse`](crate::parse), but it's a plain value and may be built by hand,
/// so [`next`](Spec::next) validates it before use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Spec {
    /// Recurrence granularity.
    pub interval: Interval,
    /// Minutes since midnight, 0-1439.
    pub time_of_day: u32,
    /// Minutes past the hour for [`Interval::Hourly`], 0-59.
    pub time_of_hour: u32,
    /// Day of the week for weekly schedules and the nth weekday form of monthly ones.
    pub day_of_week: Weekday,
    /// Day of the month, 1-31, or 0 if unused.
    pub day_of_month: u32,
    /// Nth week of the month, 1-5, or 0 if unused.
    pub week: u32,
}

impl Spec {
    /// Every hour at `minute` past.
    pub fn hourly(minute: u32) -> Self {
        Self {
            interval: Interval::Hourly,
            time_of_day: 0,
            time_of_hour: minute,
            day_of_week: Weekday::Sun,
            day_of_month: 0,
            week: 0,
        }
    }

    /// Every day at `time_of_day` minutes past midnight.
    pub fn daily(time_of_day: u32) -> Self {
        Self {
            interval: Interval::Daily,
            time_of_day,
            ..Self::hourly(0)
        }
    }

    /// Every `weekday` at `time_of_day`.
    pub fn weekly(time_of_day: u32, weekday: Weekday) -> Self {
        Self {
            interval: Interval::Weekly,
            time_of_day,
            day_of_week: weekday,
            ..Self::hourly(0)
        }
    }

    /// Every month on `day` at `time_of_day`.
    pub fn monthly_on_day(time_of_day: u32, day: u32) -> Self {
        Self {
            interval: Interval::Monthly,
            time_of_day,
            day_of_month: day,
            ..Self::hourly(0)
        }
    }

    /// Every month on the `week`-th `weekday` at `time_of_day`.
    pub fn monthly_on_weekday(time_of_day: u32, weekday: Weekday, week: u32) -> Self {
        Self {
            interval: Interval::Monthly,
            time_of_day,
            day_of_week: weekday,
            week,
            ..Self::hourly(0)
        }
    }

    /// Checks that fields used by the interval are within their ranges.
    pub fn validate(&self) -> Result<()> {
        if self.interval == Interval::Hourly {
            if self.time_of_hour >= MINUTES_PER_HOUR {
                return Err(TimespecError::InvalidMinuteOfHour(self.time_of_hour));
            }
            return Ok(());
        }

        if self.time_of_day >= MINUTES_PER_DAY {
            return Err(TimespecError::InvalidTimeOfDay(self.time_of_day));
        }

        if self.interval == Interval::Monthly {
            match (self.week, self.day_of_month) {
                (0, 0) => return Err(TimespecError::UnhandledInterval),
                (0, day) if !(1..=31).contains(&day) => return Err(TimespecError::InvalidDayOfMonth(day)),
                (week, 0) if !(1..=5).contains(&week) => return Err(TimespecError::InvalidWeek(week)),
                (0, _) | (_, 0) => {}
                (week, day_of_month) => {
                    return Err(TimespecError::ConflictingMonthlySelectors { week, day_of_month });
                }
            }
        }

        Ok(())
    }

    /// Returns time of the next event after `current`.
    ///
    /// `current` is truncated to the whole minute first. Days are stepped by fixed 24 hours.
    ///
    /// Daily and hourly events are always strictly after `current`, monthly ones are never before it.
    /// A weekly event is searched from today's time of day and only the weekday is matched,
    /// so if today is that weekday but its time has already passed, today's (past) event is returned.
    /// [`Schedule::upcoming`](crate::Schedule::upcoming) moves such an event to the next week.
    pub fn next<Tz: TimeZone>(&self, current: &DateTime<Tz>) -> Result<DateTime<Tz>> {
        self.validate()?;

        let current = utils::truncate_to_minute(current)?;

        if self.interval == Interval::Hourly {
            let target = utils::add_minutes(&utils::start_of_hour(&current)?, self.time_of_hour)?;
            return if target > current {
                Ok(target)
            } else {
                utils::add_minutes(&target, MINUTES_PER_HOUR)
            };
        }

        let mut target = utils::add_minutes(&utils::start_of_day(&current)?, self.time_of_day)?;

        match self.interval {
            Interval::Daily => {
                if target <= current {
                    target = next_day(&target)?;
                }
            }
            Interval::Weekly => {
                while target.weekday() != self.day_of_week {
                    target = next_day(&target)?;
                }
            }
            Interval::Monthly if self.week != 0 => {
                while target.weekday() != self.day_of_week || target < current {
                    target = next_day(&target)?;
                }
                while utils::nth_week(target.day()) != self.week {
                    target = utils::add_minutes(&target, 7 * MINUTES_PER_DAY)?;
                }
            }
            Interval::Monthly if self.day_of_month != 0 => {
                while target.day() != self.day_of_month || target < current {
                    target = next_day(&target)?;
                }
            }
            Interval::Monthly | Interval::Hourly => return Err(TimespecError::UnhandledInterval),
        }

        Ok(target)
    }
}

#[inline]
fn next_day<Tz: TimeZone>(time: &DateTime<Tz>) -> Result<DateTime<Tz>> {
    utils::add_minutes(time, MINUTES_PER_DAY)
}

impl Display for Spec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hours = self.time_of_day / MINUTES_PER_HOUR;
        let minutes = self.time_of_day % MINUTES_PER_HOUR;

        match self.interval {
            Interval::Hourly => write!(f, "hourly at {} after", self.time_of_hour),
            Interval::Daily => write!(f, "daily at {hours}:{minutes:02}"),
            Interval::Weekly => write!(
                f,
                "{}s at {hours}:{minutes:02}",
                utils::weekday_name(self.day_of_week)
            ),
            Interval::Monthly if self.week != 0 => write!(
                f,
                "{}{} {} at {hours}:{minutes:02}",
                self.week,
                utils::ordinal_suffix(self.week),
                utils::weekday_name(self.day_of_week)
            ),
            Interval::Monthly if self.day_of_month != 0 => write!(
                f,
                "monthly at {hours}:{minutes:02} on {}{}",
                self.day_of_month,
                utils::ordinal_suffix(self.day_of_month)
            ),
            Interval::Monthly => write!(f, "monthly at {hours}:{minutes:02}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};
    use rstest::rstest;

    fn in_minutes(hours: u32, minutes: u32) -> u32 {
        hours * 60 + minutes
    }

    // August 6th, 1991 was a Tuesday.
    //
    //          August              September
    //   Su Mo Tu We Th Fr Sa  Su Mo Tu We Th Fr Sa
    //                1  2  3   1  2  3  4  5  6  7
    //    4  5  6* 7  8  9 10   8  9 10 11 12 13 14
    //   11 12 13 14 15 16 17  15 16 17 18 19 20 21
    //   18 19 20 21 22 23 24  22 23 24 25 26 27 28
    //   25 26 27 28 29 30 31  29 30
    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("1991-08-06T11:15:42.000100203-04:00").unwrap()
    }

    fn assert_next(spec: &Spec, expected: &str) {
        let next = spec.next(&now());
        assert!(next.is_ok(), "spec = {spec:?}, next = {next:?}");
        assert_eq!(next.unwrap().to_rfc3339(), expected, "spec = {spec:?}");
    }

    #[rstest]
    #[case(30, "1991-08-06T11:30:00-04:00")]
    #[case(7, "1991-08-06T12:07:00-04:00")]
    #[case(15, "1991-08-06T12:15:00-04:00")]
    #[case(16, "1991-08-06T11:16:00-04:00")]
    #[case(0, "1991-08-06T12:00:00-04:00")]
    fn next_hourly(#[case] minute: u32, #[case] expected: &str) {
        assert_next(&Spec::hourly(minute), expected);
    }

    #[rstest]
    #[case(in_minutes(16, 0), "1991-08-06T16:00:00-04:00")]
    #[case(in_minutes(16, 30), "1991-08-06T16:30:00-04:00")]
    #[case(in_minutes(6, 7), "1991-08-07T06:07:00-04:00")]
    #[case(in_minutes(11, 15), "1991-08-07T11:15:00-04:00")]
    #[case(in_minutes(11, 16), "1991-08-06T11:16:00-04:00")]
    #[case(in_minutes(0, 0), "1991-08-07T00:00:00-04:00")]
    #[case(in_minutes(23, 59), "1991-08-06T23:59:00-04:00")]
    fn next_daily(#[case] time_of_day: u32, #[case] expected: &str) {
        assert_next(&Spec::daily(time_of_day), expected);
    }

    #[test]
    fn next_leaves_current_untouched() {
        let current = now();
        Spec::daily(in_minutes(16, 0)).next(&current).unwrap();
        assert_eq!(current.second(), 42);
    }

    #[rstest]
    #[case(Weekday::Sat, in_minutes(7, 0), "1991-08-10T07:00:00-04:00")]
    #[case(Weekday::Mon, in_minutes(19, 45), "1991-08-12T19:45:00-04:00")]
    #[case(Weekday::Tue, in_minutes(23, 55), "1991-08-06T23:55:00-04:00")]
    #[case(Weekday::Wed, in_minutes(0, 0), "1991-08-07T00:00:00-04:00")]
    fn next_weekly(#[case] weekday: Weekday, #[case] time_of_day: u32, #[case] expected: &str) {
        assert_next(&Spec::weekly(time_of_day, weekday), expected);
    }

    #[test]
    fn next_weekly_returns_todays_passed_event() {
        // Today is Tuesday and 10:00 is already gone.
        assert_next(
            &Spec::weekly(in_minutes(10, 0), Weekday::Tue),
            "1991-08-06T10:00:00-04:00",
        );
    }

    #[rstest]
    #[case(Weekday::Thu, 3, in_minutes(1, 0), "1991-08-15T01:00:00-04:00")]
    #[case(Weekday::Mon, 1, in_minutes(2, 30), "1991-09-02T02:30:00-04:00")]
    #[case(Weekday::Tue, 1, in_minutes(14, 10), "1991-08-06T14:10:00-04:00")]
    #[case(Weekday::Tue, 1, in_minutes(10, 5), "1991-09-03T10:05:00-04:00")]
    #[case(Weekday::Tue, 2, in_minutes(6, 0), "1991-08-13T06:00:00-04:00")]
    #[case(Weekday::Sat, 5, in_minutes(12, 0), "1991-08-31T12:00:00-04:00")]
    #[case(Weekday::Fri, 5, in_minutes(12, 0), "1991-08-30T12:00:00-04:00")]
    #[case(Weekday::Mon, 5, in_minutes(12, 0), "1991-09-30T12:00:00-04:00")]
    fn next_monthly_nth_weekday(
        #[case] weekday: Weekday,
        #[case] week: u32,
        #[case] time_of_day: u32,
        #[case] expected: &str,
    ) {
        assert_next(&Spec::monthly_on_weekday(time_of_day, weekday, week), expected);
    }

    #[rstest]
    #[case(15, in_minutes(1, 0), "1991-08-15T01:00:00-04:00")]
    #[case(2, in_minutes(2, 30), "1991-09-02T02:30:00-04:00")]
    #[case(6, in_minutes(14, 10), "1991-08-06T14:10:00-04:00")]
    #[case(6, in_minutes(10, 5), "1991-09-06T10:05:00-04:00")]
    #[case(6, in_minutes(11, 15), "1991-08-06T11:15:00-04:00")]
    #[case(31, in_minutes(0, 0), "1991-08-31T00:00:00-04:00")]
    fn next_monthly_day_of_month(#[case] day: u32, #[case] time_of_day: u32, #[case] expected: &str) {
        assert_next(&Spec::monthly_on_day(time_of_day, day), expected);
    }

    #[test]
    fn next_monthly_skips_short_months() {
        let current = DateTime::parse_from_rfc3339("2025-01-31T12:00:00Z").unwrap();
        let next = Spec::monthly_on_day(in_minutes(3, 0), 31).next(&current).unwrap();
        assert_eq!(next.to_rfc3339(), "2025-03-31T03:00:00+00:00");

        let next = Spec::monthly_on_day(in_minutes(3, 0), 29).next(&current).unwrap();
        assert_eq!(next.to_rfc3339(), "2025-03-29T03:00:00+00:00");
    }

    #[rstest]
    #[case(Spec::monthly_on_weekday(0, Weekday::Tue, 0), TimespecError::UnhandledInterval)]
    #[case(Spec::monthly_on_weekday(0, Weekday::Tue, 6), TimespecError::InvalidWeek(6))]
    #[case(Spec::monthly_on_day(0, 0), TimespecError::UnhandledInterval)]
    #[case(Spec::monthly_on_day(0, 32), TimespecError::InvalidDayOfMonth(32))]
    #[case(Spec::monthly_on_day(0, 40), TimespecError::InvalidDayOfMonth(40))]
    #[case(Spec::daily(1440), TimespecError::InvalidTimeOfDay(1440))]
    #[case(Spec::weekly(2000, Weekday::Mon), TimespecError::InvalidTimeOfDay(2000))]
    #[case(Spec::hourly(60), TimespecError::InvalidMinuteOfHour(60))]
    #[case(Spec::hourly(900), TimespecError::InvalidMinuteOfHour(900))]
    #[case(
        Spec { week: 2, ..Spec::monthly_on_day(0, 14) },
        TimespecError::ConflictingMonthlySelectors { week: 2, day_of_month: 14 }
    )]
    fn next_rejects_invalid_specs(#[case] spec: Spec, #[case] expected: TimespecError) {
        assert_eq!(spec.validate(), Err(expected.clone()));
        assert_eq!(spec.next(&now()), Err(expected));
    }

    #[rstest]
    #[case(Spec::monthly_on_weekday(0, Weekday::Tue, 1))]
    #[case(Spec::monthly_on_weekday(0, Weekday::Tue, 5))]
    #[case(Spec::monthly_on_day(0, 1))]
    #[case(Spec::monthly_on_day(0, 31))]
    #[case(Spec::daily(1439))]
    #[case(Spec::hourly(59))]
    fn validate_accepts_range_bounds(#[case] spec: Spec) {
        assert_eq!(spec.validate(), Ok(()));
    }

    #[test]
    fn daily_is_strictly_after_current() {
        let spec = Spec::daily(in_minutes(4, 0));
        let mut current = DateTime::parse_from_rfc3339("2024-02-27T00:00:00+02:00").unwrap();
        for _ in 0..(3 * 24 * 4) {
            let next = spec.next(&current).unwrap();
            assert!(next > current, "current = {current}, next = {next}");
            assert!(next - current <= chrono::TimeDelta::days(1), "current = {current}, next = {next}");
            assert_eq!((next.hour(), next.minute()), (4, 0));
            current = current + chrono::TimeDelta::minutes(15);
        }
    }

    #[test]
    fn weekly_lands_on_its_weekday() {
        let mut current = DateTime::parse_from_rfc3339("2024-02-26T00:00:00Z").unwrap();
        for _ in 0..(14 * 6) {
            for weekday in [Weekday::Sun, Weekday::Wed, Weekday::Sat] {
                let next = Spec::weekly(in_minutes(11, 30), weekday).next(&current).unwrap();
                assert_eq!(next.weekday(), weekday, "current = {current}");
            }
            current = current + chrono::TimeDelta::hours(4);
        }
    }

    #[test]
    fn monthly_lands_on_its_week_or_day() {
        let mut current = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        for _ in 0..400 {
            let next = Spec::monthly_on_weekday(in_minutes(6, 0), Weekday::Tue, 2)
                .next(&current)
                .unwrap();
            assert_eq!(next.weekday(), Weekday::Tue);
            assert!((7..=13).contains(&next.day()), "current = {current}, next = {next}");
            assert!(next >= current);

            let next = Spec::monthly_on_weekday(in_minutes(6, 0), Weekday::Tue, 1)
                .next(&current)
                .unwrap();
            assert!((1..=6).contains(&next.day()), "current = {current}, next = {next}");

            let next = Spec::monthly_on_day(in_minutes(6, 0), 15).next(&current).unwrap();
            assert_eq!(next.day(), 15);
            assert!(next >= current);

            current = current + chrono::TimeDelta::hours(23);
        }
    }

    #[test]
    fn next_keeps_timezone() {
        let current = DateTime::parse_from_rfc3339("2024-06-30T23:30:00+09:00").unwrap();
        let next = Spec::monthly_on_day(in_minutes(0, 15), 1).next(&current).unwrap();
        assert_eq!(next.to_rfc3339(), "2024-07-01T00:15:00+09:00");
    }

    #[rstest]
    #[case(Spec::hourly(45), "hourly at 45 after")]
    #[case(Spec::daily(in_minutes(16, 0)), "daily at 16:00")]
    #[case(Spec::weekly(in_minutes(23, 35), Weekday::Thu), "thursdays at 23:35")]
    #[case(Spec::monthly_on_weekday(in_minutes(2, 5), Weekday::Tue, 3), "3rd tuesday at 2:05")]
    #[case(Spec::monthly_on_day(in_minutes(2, 5), 14), "monthly at 2:05 on 14th")]
    #[case(Spec::monthly_on_day(0, 0), "monthly at 0:00")]
    fn display(#[case] spec: Spec, #[case] expected: &str) {
        assert_eq!(spec.to_string(), expected);
    }

    #[rstest]
    #[case(Interval::Hourly, 2, 48)]
    #[case(Interval::Daily, 30, 30)]
    #[case(Interval::Weekly, 30, 4)]
    #[case(Interval::Monthly, 90, 3)]
    #[case(Interval::Monthly, 29, 0)]
    #[case(Interval::Hourly, u32::MAX / 24, u32::MAX / 24 * 24)]
    #[case(Interval::Hourly, u32::MAX / 10, u32::MAX)]
    #[case(Interval::Hourly, u32::MAX, u32::MAX)]
    #[case(Interval::Daily, u32::MAX, u32::MAX)]
    fn runs_in_days(#[case] interval: Interval, #[case] days: u32, #[case] expected: u32) {
        assert_eq!(interval.runs_in_days(days), expected);
    }
}
