//! Human-readable recurring schedules, like `daily at 4am` or `monthly on the 2nd friday at 6am`.
#![deny(unsafe_code, missing_docs)]

//! This crate is intended to:
//! - parse short English schedule phrases, typically used to describe backup or maintenance jobs;
//! - calculate the time of the next occurrence of such a schedule;
//! - generate series of occurrences.
//!
//! _This is not a job scheduler or runner_, it only tells you when the next run is due.
//!
//! ## Schedule phrases
//!
//! Phrases are case-insensitive, any amount of whitespace may separate words.
//! There are four kinds of schedules:
//!
//! | Interval | Examples                                                                   |
//! |----------|----------------------------------------------------------------------------|
//! | Hourly   | `hourly at 30`, `every hour at x:30`, `hourly at quarter til`, `hourly 10 after` |
//! | Daily    | `daily at 4am`, `every day at 16:30`, `daily 2:30 pm`                       |
//! | Weekly   | `weekly on tuesday at 11:30pm`, `on tues at 6am`, `fridays`, `at 5pm on sat` |
//! | Monthly  | `monthly on the 15th at 2am`, `monthly on the 2nd friday at 6am`, `3rd sun` |
//!
//! Times of day are `H`, `H:MM` or either of them followed by `am` or `pm`.
//! Noon is `12pm` and `12am` is noon as well, use `0:00` for midnight.
//! Weekly and monthly phrases without a time run at midnight, daily ones must name a time.
//!
//! Weekdays may be spelled short (`tue`, `tues`, `thur`, `thurs`), full (`tuesday`) or plural (`tuesdays`).
//!
//! Monthly phrases select either a day of the month (`15th`) or the nth weekday of the month (`2nd friday`).
//! The nth weekday counts weeks as `day / 7 + 1`, so days 1-6 are the 1st week, 7-13 the 2nd and so on.
//! Days of month which don't exist in a month (like the `31st` in April) skip that month.
//!
//! Each phrase has a canonical text form produced by `Display`, which parses back into the same schedule.
//!
//! ### Schedule with timezone
//! If `tz` feature is enabled, it's possible to prefix a schedule with timezone, for example:
//! - `TZ=Europe/Paris monthly on the 1st`
//! - `TZ=EET daily at 4am`
//!
//! ## How to use
//!
//! The quickest way is [`parse()`] which returns a plain [`Spec`] and [`Spec::next()`] to calculate the next
//! occurrence after any point in time:
//!
//! ```rust
//! use chrono::DateTime;
//! use timespec::Result;
//!
//! fn next_backup() -> Result<()> {
//!     let spec = timespec::parse("weekly on tuesday at 11:30pm")?;
//!     let now = DateTime::parse_from_rfc3339("1991-08-06T11:15:42-04:00").unwrap();
//!
//!     let next = spec.next(&now)?;
//!     assert_eq!(next.to_rfc3339(), "1991-08-06T23:30:00-04:00");
//!
//!     Ok(())
//! }
//! # next_backup().unwrap();
//! ```
//!
//! The [`Schedule`] structure wraps a validated spec and adds iteration, timezone and (de)serialization support:
//! - [new()](Schedule::new): constructor to parse and validate provided schedule;
//! - [upcoming()](Schedule::upcoming): returns time of the next event, starting from the provided timestamp;
//! - [iter()](Schedule::iter): returns an `Iterator` which produces a series of timestamps according to the schedule.
//!
//! ### Example with `iter`
//! ```rust
//! use chrono::Utc;
//! use timespec::{Result, Schedule};
//!
//! fn iterator() -> Result<()> {
//!     let schedule = Schedule::new("monthly on the 2nd friday at 6am")?;
//!     let now = Utc::now();
//!
//!     // Get the next 10 timestamps starting from now
//!     schedule.iter(&now).take(10).for_each(|t| println!("next: {t}"));
//!
//!     Ok(())
//! }
//! # iterator().unwrap();
//! ```
//!
//! # Feature flags
//! * `serde`: adds [`Serialize`](https://docs.rs/serde/latest/serde/trait.Serialize.html) and [`Deserialize`](https://docs.rs/serde/latest/serde/trait.Deserialize.html) trait implementation for [`Schedule`].
//! * `tz`: enables support of [schedules with timezone](#schedule-with-timezone).

use chrono::{DateTime, Local};
use std::path::Path;

/// Crate specific Error implementation.
pub mod error;
/// Tokenizer of schedule phrases.
pub mod lexer;
mod parser;
/// Schedule wrapper with validation, iteration and timezone support.
pub mod schedule;
/// Parsed schedule and next occurrence calculation.
pub mod spec;
mod utils;

// Re-export of public entities.
pub use error::TimespecError;
pub use lexer::{Keyword, Lexer, Lexicon, Token};
pub use schedule::Schedule;
pub use spec::{Interval, Spec};

/// Convenient alias for `Result`.
pub type Result<T, E = TimespecError> = std::result::Result<T, E>;

/// Parses a schedule phrase into a [`Spec`].
///
/// Only the grammar is checked here, use [`Spec::validate()`] or [`Schedule::new()`]
/// to reject out of range ordinals like `monthly on the 40th`.
pub fn parse(input: &str) -> Result<Spec> {
    parser::Parser::new(input, &Lexicon::default())?.parse()
}

/// Reads the whole file at `path` and parses its content as a schedule phrase.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Spec> {
    let input = lexer::read_schedule_file(path.as_ref())?;
    parse(&input)
}

/// Parses `input` and returns its next occurrence after the current local time.
pub fn next(input: &str) -> Result<DateTime<Local>> {
    parse(input)?.next(&Local::now())
}
