//! Field expression classifier.
//!
//! Each field fragment is classified by its surface syntax rather than tokenized:
//! the five supported forms are simple and mutually distinguishable by shape.
use crate::{
    field::{FieldKind, FieldValue},
    series::FieldValues,
    utils::{parse_digital_value, parse_number},
    CronError, Result,
};
use regex::Regex;
use std::sync::OnceLock;

fn range_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // a dash between two digits: `1-10`
    REGEX.get_or_init(|| Regex::new(r"\d-\d").expect("range regex should compile"))
}

fn repeat_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // anything followed by a slash and a digit: `*/5`, `10/5`
    REGEX.get_or_init(|| Regex::new(r"./\d").expect("repeat regex should compile"))
}

fn literal_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // a number or a comma-separated list of numbers: `5`, `1,2,3`
    REGEX.get_or_init(|| Regex::new(r"(\d+)(,\s*\d+)*").expect("literal regex should compile"))
}

impl FieldValues {
    /// Parses a single field fragment in context of the field `kind`.
    ///
    /// Forms are tried in the fixed order: wildcard, range, repeat, literal list.
    /// Returns [`CronError`] if the fragment matches none of them or any of its values is invalid.
    pub fn parse(kind: FieldKind, input: &str) -> Result<Self> {
        let trimmed = input.trim();

        if trimmed == "*" {
            wildcard(kind, trimmed)
        } else if range_regex().is_match(trimmed) {
            range(kind, trimmed)
        } else if repeat_regex().is_match(trimmed) {
            repeat(kind, trimmed)
        } else if literal_regex().is_match(trimmed) {
            literal(kind, trimmed)
        } else {
            Err(CronError::UnknownExpression {
                field: kind,
                input: input.to_owned(),
            })
        }
    }
}

/// `*`: every value of the field.
pub(crate) fn wildcard(kind: FieldKind, input: &str) -> Result<FieldValues> {
    if input != "*" {
        return Err(CronError::UnknownExpression {
            field: kind,
            input: input.to_owned(),
        });
    }

    FieldValues::sequence(kind.min(), kind.max(), 1)
}

/// `x-y`, or a lone `x` which yields a single-value set.
pub(crate) fn range(kind: FieldKind, input: &str) -> Result<FieldValues> {
    let parts: Vec<&str> = input.split('-').collect();
    if parts.len() > 2 {
        return Err(CronError::InvalidRangeValue(input.to_owned()));
    }

    let start = parse_digital_value(parts[0], kind)?;
    let Some(end) = parts.get(1) else {
        return Ok(FieldValues::irregular([start]));
    };

    let end = parse_digital_value(end, kind)?;
    if start > end {
        return Err(CronError::InvalidRangeValue(input.to_owned()));
    }

    FieldValues::sequence(start, end, 1)
}

/// `*/step` or `start/step`, the run always ends at the field's maximum.
pub(crate) fn repeat(kind: FieldKind, input: &str) -> Result<FieldValues> {
    let Some((base, step)) = input.split_once('/').filter(|(_, step)| !step.contains('/')) else {
        return Err(CronError::InvalidRepeatingPattern(input.to_owned()));
    };

    let step = parse_number(step)?;
    if step == 0 {
        return Err(CronError::InvalidRepeatingPattern(input.to_owned()));
    }
    let step = FieldValue::try_from(step)
        .ok()
        .filter(|step| *step <= kind.max())
        .ok_or_else(|| CronError::ValueOutOfBounds {
            field: kind,
            value: input.to_owned(),
        })?;

    let start = if base.trim() == "*" {
        kind.min()
    } else {
        parse_digital_value(base, kind)?
    };

    FieldValues::sequence(start, kind.max(), step)
}

/// `x[,y[,z...]]`: explicit list of values.
pub(crate) fn literal(kind: FieldKind, input: &str) -> Result<FieldValues> {
    let values = input
        .split(',')
        .map(|part| parse_digital_value(part, kind))
        .collect::<Result<Vec<_>>>()?;

    Ok(FieldValues::irregular(values))
}
