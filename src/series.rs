//! Enumerable field values and their sorted representation.
use crate::{
    field::{FieldKind, FieldValue},
    CronError, Result,
};
use std::{collections::BTreeSet, fmt::Display};

/// Parsed set of values a single cron field matches.
///
/// Both variants enumerate into an ascending sequence without duplicates,
/// every consumer of [`enumerate()`](FieldValues::enumerate) relies on that.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldValues {
    /// Arithmetic run `start, start+step, ...` up to `end` inclusively.
    Sequence {
        /// First value.
        start: FieldValue,
        /// Inclusive upper limit.
        end: FieldValue,
        /// Distance between neighbours, never zero.
        step: FieldValue,
    },
    /// Explicit list of values.
    Irregular(BTreeSet<FieldValue>),
}

impl FieldValues {
    /// Constructs an arithmetic run.
    ///
    /// Returns [`CronError::InvalidSequence`] if `step` is zero or `end` is less than `start`.
    pub fn sequence(start: FieldValue, end: FieldValue, step: FieldValue) -> Result<Self> {
        if step == 0 || end < start {
            return Err(CronError::InvalidSequence { start, end, step });
        }

        Ok(Self::Sequence { start, end, step })
    }

    /// Constructs an explicit set from values in any order, duplicates are dropped.
    pub fn irregular(values: impl IntoIterator<Item = FieldValue>) -> Self {
        Self::Irregular(values.into_iter().collect())
    }

    /// Returns an iterator over the matching values in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = FieldValue> + '_ {
        match self {
            Self::Sequence { start, end, step } => Values::Series(SeriesWithStep::new(*start, *end, *step)),
            Self::Irregular(values) => Values::Set(values.iter()),
        }
    }

    /// Returns all matching values, sorted ascending and without duplicates.
    #[inline]
    pub fn enumerate(&self) -> Vec<FieldValue> {
        self.iter().collect()
    }

    /// Canonical text representation in context of the field `kind`,
    /// it's parsable back into an equal value by the field parser.
    pub(crate) fn pattern(&self, kind: FieldKind) -> String {
        let (min, max) = kind.bounds();
        match self {
            Self::Sequence { start, end, step: 1 } if *start == min && *end == max => "*".to_owned(),
            Self::Sequence { start, end, step } if *start == min && *end == max => format!("*/{step}"),
            Self::Sequence { start, end, step } if *end == max && *step > 1 => format!("{start}/{step}"),
            Self::Sequence { start, end, step: 1 } => format!("{start}-{end}"),
            _ => self.to_string(),
        }
    }
}

/// Renders the explicit comma-separated list of all values.
impl Display for FieldValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values = self.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",");
        write!(f, "{values}")
    }
}

enum Values<'a> {
    Series(SeriesWithStep),
    Set(std::collections::btree_set::Iter<'a, FieldValue>),
}

impl Iterator for Values<'_> {
    type Item = FieldValue;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Values::Series(series) => series.next(),
            Values::Set(values) => values.next().copied(),
        }
    }
}

/// Generator (iterator) state of an arithmetic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct SeriesWithStep {
    end: FieldValue,
    step: FieldValue,
    next: Option<FieldValue>,
}

impl SeriesWithStep {
    /// Caller is responsible to ensure that `step` isn't zero.
    #[inline]
    pub(crate) fn new(start: FieldValue, end: FieldValue, step: FieldValue) -> Self {
        let next = if start > end { None } else { Some(start) };
        Self { end, step, next }
    }
}

impl Iterator for SeriesWithStep {
    type Item = FieldValue;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.checked_add(self.step).filter(|next| *next <= self.end);
        Some(current)
    }
}

/// Enumerated values of one field, prepared for fast lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ValueSet(Vec<FieldValue>);

impl ValueSet {
    /// Returns `true` if `value` is in the set.
    #[inline]
    pub(crate) fn contains(&self, value: FieldValue) -> bool {
        self.0.binary_search(&value).is_ok()
    }

    /// Returns the smallest value in the set which is equal to or greater than `value`.
    #[inline]
    pub(crate) fn ceiling(&self, value: FieldValue) -> Option<FieldValue> {
        let index = self.0.partition_point(|v| *v < value);
        self.0.get(index).copied()
    }
}

impl From<&FieldValues> for ValueSet {
    fn from(values: &FieldValues) -> Self {
        Self(values.enumerate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 5, 1, vec![0, 1, 2, 3, 4, 5])]
    #[case(0, 10, 2, vec![0, 2, 4, 6, 8, 10])]
    #[case(0, 9, 2, vec![0, 2, 4, 6, 8])]
    #[case(0, 5, 6, vec![0])]
    #[case(10, 59, 5, vec![10, 15, 20, 25, 30, 35, 40, 45, 50, 55])]
    #[case(7, 7, 1, vec![7])]
    #[case(250, 255, 3, vec![250, 253])]
    fn test_sequence_enumerate(
        #[case] start: FieldValue,
        #[case] end: FieldValue,
        #[case] step: FieldValue,
        #[case] expected: Vec<FieldValue>,
    ) {
        let seq = FieldValues::sequence(start, end, step).unwrap();
        let values = seq.enumerate();

        assert_eq!(values, expected);
        assert_eq!(values.first(), Some(&start));
        assert!(values.iter().all(|v| *v <= end));
        assert!(values.windows(2).all(|w| w[1] - w[0] == step));
        // idempotent
        assert_eq!(seq.enumerate(), values);
    }

    #[rstest]
    #[case(10, 0, 1)]
    #[case(0, 10, 0)]
    #[case(5, 4, 0)]
    fn test_invalid_sequence(#[case] start: FieldValue, #[case] end: FieldValue, #[case] step: FieldValue) {
        assert_eq!(
            FieldValues::sequence(start, end, step),
            Err(CronError::InvalidSequence { start, end, step })
        );
    }

    #[rstest]
    #[case(vec![1, 3, 4, 10], vec![1, 3, 4, 10])]
    #[case(vec![1, 10, 3, 4], vec![1, 3, 4, 10])]
    #[case(vec![1, 1, 2, 2, 3, 3], vec![1, 2, 3])]
    #[case(vec![25], vec![25])]
    #[case(vec![], vec![])]
    fn test_irregular_enumerate(#[case] input: Vec<FieldValue>, #[case] expected: Vec<FieldValue>) {
        let values = FieldValues::irregular(input);
        assert_eq!(values.enumerate(), expected);
        assert_eq!(values.enumerate(), expected);
    }

    #[rstest]
    #[case(FieldValues::sequence(0, 59, 1).unwrap(), FieldKind::Minute, "*")]
    #[case(FieldValues::sequence(1, 7, 1).unwrap(), FieldKind::DayOfWeek, "*")]
    #[case(FieldValues::sequence(0, 59, 10).unwrap(), FieldKind::Minute, "*/10")]
    #[case(FieldValues::sequence(10, 59, 5).unwrap(), FieldKind::Minute, "10/5")]
    #[case(FieldValues::sequence(3, 5, 1).unwrap(), FieldKind::Hour, "3-5")]
    #[case(FieldValues::sequence(3, 11, 4).unwrap(), FieldKind::Hour, "3,7,11")]
    #[case(FieldValues::sequence(5, 23, 1).unwrap(), FieldKind::Hour, "5-23")]
    #[case(FieldValues::irregular([2, 1]), FieldKind::DayOfMonth, "1,2")]
    #[case(FieldValues::irregular([7]), FieldKind::Month, "7")]
    fn test_pattern(#[case] values: FieldValues, #[case] kind: FieldKind, #[case] expected: &str) {
        assert_eq!(values.pattern(kind), expected);
    }

    #[test]
    fn test_display_explicit_list() {
        assert_eq!(FieldValues::sequence(0, 10, 5).unwrap().to_string(), "0,5,10");
        assert_eq!(FieldValues::irregular([3, 1, 3]).to_string(), "1,3");
    }

    #[rstest]
    #[case(FieldValues::sequence(0, 59, 1).unwrap())]
    #[case(FieldValues::sequence(10, 59, 5).unwrap())]
    #[case(FieldValues::sequence(1, 31, 7).unwrap())]
    #[case(FieldValues::irregular([1, 2, 30, 31]))]
    #[case(FieldValues::irregular([59]))]
    #[case(FieldValues::irregular([]))]
    fn test_value_set_agrees_with_linear_scan(#[case] values: FieldValues) {
        let enumerated = values.enumerate();
        let set = ValueSet::from(&values);

        for value in 0..=FieldValue::MAX {
            assert_eq!(set.contains(value), enumerated.contains(&value), "value = {value}");
            assert_eq!(
                set.ceiling(value),
                enumerated.iter().copied().find(|v| *v >= value),
                "value = {value}"
            );
        }
    }
}
