use crate::field::{FieldKind, FieldValue};
use thiserror::Error;

/// Crate specific Errors implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
pub enum CronError {
    /// Expression has fewer than five whitespace-separated fields.
    #[error("invalid cron expression: {0:?}")]
    InvalidCronExpression(String),
    /// Field fragment doesn't match any known syntax.
    #[error("unknown {field} expression: {input:?}")]
    UnknownExpression {
        /// Field the fragment belongs to.
        field: FieldKind,
        /// Offending fragment.
        input: String,
    },
    /// Value is outside of the field's bounds.
    #[error("invalid {field} value: {value}")]
    ValueOutOfBounds {
        /// Field the value belongs to.
        field: FieldKind,
        /// Offending value as it was written.
        value: String,
    },
    /// Invalid range value specified.
    #[error("invalid range value: {0}")]
    InvalidRangeValue(String),
    /// Invalid repeating pattern specified.
    #[error("invalid repeating pattern: {0}")]
    InvalidRepeatingPattern(String),
    /// Token isn't an unsigned integer.
    #[error("invalid digital value: {0:?}")]
    InvalidDigitalValue(String),
    /// Arithmetic run with zero step or with the end before the start.
    #[error("invalid sequence: start={start}, end={end}, step={step}")]
    InvalidSequence {
        /// First value of the run.
        start: FieldValue,
        /// Inclusive upper limit of the run.
        end: FieldValue,
        /// Distance between values.
        step: FieldValue,
    },
    /// Unknown timezone name.
    #[cfg(feature = "tz")]
    #[error("invalid timezone: {0}")]
    InvalidTimeZone(String),
}
