use crate::{field::FieldKind, series::FieldValues, CronError, Result};
use std::{fmt::Display, str::FromStr};
use tracing::trace;

/// Parsed five-field cron expression with the trailing command.
///
/// It's immutable once parsed: all values of every field lie within the field's bounds.
/// Command is optional, it's an empty string if the expression has exactly five fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String"))]
#[cfg_attr(feature = "serde", serde(into = "String"))]
pub struct CronExpression {
    minutes: FieldValues,
    hours: FieldValues,
    days_of_month: FieldValues,
    months: FieldValues,
    days_of_week: FieldValues,
    command: String,
}

impl CronExpression {
    /// Parses and validates provided `input`: five whitespace-separated fields and optional command.
    ///
    /// Words after the fifth field are joined with single spaces into the command.
    /// Fields are parsed in order minute, hour, day of month, month, day of week,
    /// the first failure is returned.
    pub fn new(input: impl Into<String>) -> Result<Self> {
        let input = input.into();
        let elements: Vec<&str> = input.split_whitespace().collect();

        if elements.len() < FieldKind::ALL.len() {
            return Err(CronError::InvalidCronExpression(input));
        }

        let expression = Self {
            minutes: FieldValues::parse(FieldKind::Minute, elements[0])?,
            hours: FieldValues::parse(FieldKind::Hour, elements[1])?,
            days_of_month: FieldValues::parse(FieldKind::DayOfMonth, elements[2])?,
            months: FieldValues::parse(FieldKind::Month, elements[3])?,
            days_of_week: FieldValues::parse(FieldKind::DayOfWeek, elements[4])?,
            command: elements[5..].join(" "),
        };

        trace!(input = %input, expression = %expression, "cron expression parsed");
        Ok(expression)
    }

    /// Values of the minute field.
    #[inline]
    pub fn minutes(&self) -> &FieldValues {
        &self.minutes
    }

    /// Values of the hour field.
    #[inline]
    pub fn hours(&self) -> &FieldValues {
        &self.hours
    }

    /// Values of the day of month field.
    #[inline]
    pub fn days_of_month(&self) -> &FieldValues {
        &self.days_of_month
    }

    /// Values of the month field.
    #[inline]
    pub fn months(&self) -> &FieldValues {
        &self.months
    }

    /// Values of the day of week field, `7` is Sunday.
    #[inline]
    pub fn days_of_week(&self) -> &FieldValues {
        &self.days_of_week
    }

    /// Command text, may be empty.
    #[inline]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Values of the field of the specified `kind`.
    pub fn field(&self, kind: FieldKind) -> &FieldValues {
        match kind {
            FieldKind::Minute => &self.minutes,
            FieldKind::Hour => &self.hours,
            FieldKind::DayOfMonth => &self.days_of_month,
            FieldKind::Month => &self.months,
            FieldKind::DayOfWeek => &self.days_of_week,
        }
    }
}

impl From<CronExpression> for String {
    fn from(value: CronExpression) -> Self {
        value.to_string()
    }
}

impl From<&CronExpression> for String {
    fn from(value: &CronExpression) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for CronExpression {
    type Error = CronError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&String> for CronExpression {
    type Error = CronError;

    fn try_from(value: &String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CronExpression {
    type Error = CronError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl FromStr for CronExpression {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Display for CronExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = FieldKind::ALL
            .iter()
            .map(|kind| self.field(*kind).pattern(*kind))
            .collect::<Vec<_>>()
            .join(" ");

        if self.command.is_empty() {
            write!(f, "{fields}")
        } else {
            write!(f, "{fields} {}", self.command)
        }
    }
}
