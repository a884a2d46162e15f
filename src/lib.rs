//! Five-field cron expression parser and timezone-aware occurrence forecaster.
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! This crate is intended to:
//! - parse classic five-field cron expressions with a trailing command;
//! - expand every field into the explicit list of values it matches;
//! - compute the next occurrence, or the next N occurrences, of an expression in any timezone;
//! - fire occurrences in real time via a blocking timer or (optionally) async sleep and stream.
//!
//! _This is not a cron jobs runner._ The command text is parsed and kept, but never executed.
//!
//! ## Cron expression format
//!
//! An expression consists of five whitespace-separated fields, followed by an optional command:
//! minutes, hours, days of month, months and days of week.
//! Any words after the fifth field are joined with single spaces into the command.
//!
//! The table below describes valid values of each field:
//!
//! | Field        | Allowed values | Note                   |
//! |--------------|----------------|------------------------|
//! | Minute       | 0-59           |                        |
//! | Hour         | 0-23           |                        |
//! | Day of Month | 1-31           |                        |
//! | Month        | 1-12           | no names like `JAN`    |
//! | Day of Week  | 1-7            | `1` is Monday, `7` is Sunday |
//!
//! Every field accepts one of these forms:
//! - `*` - each possible value, i.e. `0,1,2,...,59` for minutes;
//! - `x-y` - range of values, i.e. `9-17`;
//! - `*/step` - repeating values starting from the field's minimum, i.e. `*/15`;
//! - `x/step` - repeating values starting from `x` up to the field's maximum, i.e. `10/5`;
//! - `x,y,z` - list of values, i.e. `1,15`, a single number is a list too.
//!
//! A field form can't be combined with another one: `1-5,10` or `0-30/5` are invalid.
//!
//! Both day of month and day of week have to match, so `0 0 13 * 5` fires on Friday the 13th only.
//! Expressions which never match, like `* * 30 2 *`, are valid: all searches simply return nothing.
//!
//! ## How to use
//!
//! Parse an expression into [`CronExpression`], bind it to a timezone with [`Schedule`] and ask:
//! - [next_from()](Schedule::next_from): the first occurrence equal to or later than the provided timestamp;
//! - [next_after()](Schedule::next_after): the first occurrence strictly later than the provided timestamp;
//! - [project_from()](Schedule::project_from): a vector of the next N occurrences;
//! - [iter()](Schedule::iter): an `Iterator` over all the occurrences;
//! - [timer()](Schedule::timer): a [`ScheduleTimer`] which fires occurrences in real time.
//!
//! Occurrences always fall at the start of a minute; a timestamp with non-zero seconds is
//! rounded up to the next minute before the search.
//!
//! ### Example with `next_from`
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use cron_forecast::{CronExpression, Result, Schedule};
//!
//! fn next() -> Result<()> {
//!     let expression = CronExpression::new("10/5 3-5 1,2 7 2 /usr/bin/backup")?;
//!     let schedule = Schedule::utc(expression);
//!     let epoch = Utc.timestamp_opt(0, 0).unwrap();
//!
//!     let next = schedule.next_from(&epoch);
//!     assert_eq!(next, Some(Utc.with_ymd_and_hms(1974, 7, 2, 3, 10, 0).unwrap()));
//!
//!     Ok(())
//! }
//! # next().unwrap();
//! ```
//!
//! ### Example with `project`
//! ```rust
//! use chrono::FixedOffset;
//! use cron_forecast::{CronExpression, Result, Schedule};
//!
//! fn project() -> Result<()> {
//!     let tz = FixedOffset::east_opt(2 * 3600).unwrap();
//!     let schedule = Schedule::new(tz, "0 9-18 * * 1-5".parse()?);
//!
//!     // Get the next 10 working hours in UTC+2 starting from now
//!     for next in schedule.project(10) {
//!         println!("next: {next}");
//!     }
//!
//!     Ok(())
//! }
//! # project().unwrap();
//! ```
//!
//! ### Timezones and DST
//! All fields are matched against the local wall-clock time of the schedule's timezone.
//! Local times skipped by a DST transition never fire; local times which happen twice
//! fire once, at the earlier instant.
//!
//! # Feature flags
//! * `serde`: adds [`Serialize`](https://docs.rs/serde/latest/serde/trait.Serialize.html) and [`Deserialize`](https://docs.rs/serde/latest/serde/trait.Deserialize.html) trait implementation for [`CronExpression`].
//! * `tz`: adds `Schedule::in_timezone()` which takes an IANA timezone name, like `Europe/Kyiv`.
//! * `async`: adds `Schedule::sleep()` and `Schedule::stream()` with [futures](https://crates.io/crates/futures) compatible async primitives.

/// Primitives related to async occurrences generation.
#[cfg(feature = "async")]
pub mod asynchronous;
/// Crate specific Error implementation.
pub mod error;
/// Parsed cron expression.
pub mod expression;
/// Cron field kinds and their bounds.
pub mod field;
mod parser;
/// Human-readable table view of an expression.
pub mod report;
/// Timezone-aware occurrences search.
pub mod schedule;
mod series;
/// Blocking real-time timer.
pub mod timer;
mod utils;

// Re-export of public entities.
#[cfg(feature = "async")]
pub use asynchronous::{ScheduleSleep, ScheduleStream};

pub use error::CronError;
pub use expression::CronExpression;
pub use field::{FieldKind, FieldValue};
pub use report::Table;
pub use schedule::{Schedule, ScheduleIterator};
pub use series::FieldValues;
pub use timer::{Events, ScheduleTimer};

/// Convenient alias for `Result`.
pub type Result<T, E = CronError> = std::result::Result<T, E>;
