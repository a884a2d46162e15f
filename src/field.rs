use std::fmt::Display;

/// Numeric type of every cron field value.
pub type FieldValue = u8;

/// One of the five positions of a cron expression.
///
/// Bounds are fixed per kind and never depend on the calendar:
/// day of month always spans `1..=31`, days that don't exist in a short month simply never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldKind {
    /// Minute of the hour, `0..=59`.
    Minute,
    /// Hour of the day, `0..=23`.
    Hour,
    /// Day of the month, `1..=31`.
    DayOfMonth,
    /// Month of the year, `1..=12`.
    Month,
    /// Day of the week, `1..=7`, where `1` is Monday and `7` is Sunday.
    DayOfWeek,
}

impl FieldKind {
    /// All kinds in expression order.
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Minute,
        FieldKind::Hour,
        FieldKind::DayOfMonth,
        FieldKind::Month,
        FieldKind::DayOfWeek,
    ];

    /// Inclusive lower bound.
    #[inline]
    pub const fn min(self) -> FieldValue {
        self.bounds().0
    }

    /// Inclusive upper bound.
    #[inline]
    pub const fn max(self) -> FieldValue {
        self.bounds().1
    }

    /// Inclusive `(min, max)` pair.
    pub const fn bounds(self) -> (FieldValue, FieldValue) {
        match self {
            Self::Minute => (0, 59),
            Self::Hour => (0, 23),
            Self::DayOfMonth => (1, 31),
            Self::Month => (1, 12),
            Self::DayOfWeek => (1, 7),
        }
    }

    /// Returns `true` if `value` lies within the kind's bounds.
    #[inline]
    pub const fn contains(self, value: FieldValue) -> bool {
        let (min, max) = self.bounds();
        value >= min && value <= max
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::DayOfMonth => "day of month",
            Self::Month => "month",
            Self::DayOfWeek => "day of week",
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
