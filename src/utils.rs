//! Common utility functions.
use crate::{
    field::{FieldKind, FieldValue},
    CronError, Result,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

/// Converts string into unsigned number without bounds validation.
pub(crate) fn parse_number(input: &str) -> Result<u32> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| CronError::InvalidDigitalValue(input.to_owned()))
}

/// Converts string into a field value with validation against the field's bounds.
pub(crate) fn parse_digital_value(input: &str, kind: FieldKind) -> Result<FieldValue> {
    let value = parse_number(input)?;
    FieldValue::try_from(value)
        .ok()
        .filter(|v| kind.contains(*v))
        .ok_or_else(|| CronError::ValueOutOfBounds {
            field: kind,
            value: input.trim().to_owned(),
        })
}

/// Rounds time up to the start of the next whole minute, if it isn't at the minute start already.
pub(crate) fn ceil_to_minute(time: NaiveDateTime) -> Option<NaiveDateTime> {
    let floor = floor_to_minute(time)?;
    if floor == time {
        Some(floor)
    } else {
        floor.checked_add_signed(TimeDelta::minutes(1))
    }
}

/// Truncates seconds and fractions of the second.
#[inline]
pub(crate) fn floor_to_minute(time: NaiveDateTime) -> Option<NaiveDateTime> {
    time.with_second(0)?.with_nanosecond(0)
}

/// Returns midnight of the first day of the month after the `date`'s month.
pub(crate) fn first_day_of_next_month(date: NaiveDate) -> Option<NaiveDateTime> {
    let next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year().checked_add(1)?, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };

    next?.and_hms_opt(0, 0, 0)
}

/// Returns midnight of the day after `date`.
#[inline]
pub(crate) fn start_of_next_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.succ_opt()?.and_hms_opt(0, 0, 0)
}

/// Returns the start of the hour after the `time`'s hour.
#[inline]
pub(crate) fn start_of_next_hour(time: NaiveDateTime) -> Option<NaiveDateTime> {
    time.with_minute(0)?
        .with_second(0)?
        .with_nanosecond(0)?
        .checked_add_signed(TimeDelta::hours(1))
}
