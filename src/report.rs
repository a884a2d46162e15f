//! Human-readable table of the expanded expression.
use crate::{expression::CronExpression, field::FieldKind};
use std::fmt::Display;

const LABEL_WIDTH: usize = 14;

/// Row label of the field, the hour row is plural in the table.
const fn row_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Hour => "hours",
        _ => kind.label(),
    }
}

/// Renders all enumerated field values of a [`CronExpression`], one field per line,
/// followed by the command line.
///
/// ```rust
/// use cron_forecast::CronExpression;
///
/// let expression = CronExpression::new("*/15 0 1,15 * 1-5 /usr/bin/find").unwrap();
/// let table = expression.table().to_string();
///
/// assert_eq!(table.lines().next(), Some("minute        0 15 30 45"));
/// assert_eq!(table.lines().last(), Some("command       /usr/bin/find"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    expression: &'a CronExpression,
}

impl CronExpression {
    /// Returns a [`Table`] view of the expression.
    #[inline]
    pub fn table(&self) -> Table<'_> {
        Table { expression: self }
    }
}

impl Display for Table<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for kind in FieldKind::ALL {
            let values = self
                .expression
                .field(kind)
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{:<LABEL_WIDTH$}{values}", row_label(kind))?;
        }

        writeln!(f, "{:<LABEL_WIDTH$}{}", "command", self.expression.command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_table() {
        let expression = CronExpression::new("*/15 0 1,15 * 1-5 /usr/bin/find").unwrap();
        let expected = "\
minute        0 15 30 45
hours         0
day of month  1 15
month         1 2 3 4 5 6 7 8 9 10 11 12
day of week   1 2 3 4 5
command       /usr/bin/find
";

        assert_eq!(expression.table().to_string(), expected);
    }

    #[test]
    fn test_row_labels() {
        let expression = CronExpression::new("0 0 1 1 1").unwrap();
        let labels = expression
            .table()
            .to_string()
            .lines()
            .map(|row| row[..LABEL_WIDTH].trim_end().to_owned())
            .collect::<Vec<_>>();

        assert_eq!(labels, ["minute", "hours", "day of month", "month", "day of week", "command"]);
        // error messages keep the singular field name
        assert_eq!(FieldKind::Hour.to_string(), "hour");
    }

    #[rstest]
    #[case("* * * * *", 60, 24, 31, 12, 7)]
    #[case("10/5 3-5 1,2 7 2", 10, 3, 2, 1, 1)]
    #[case("0 0 1 1 *", 1, 1, 1, 1, 7)]
    fn test_table_columns(
        #[case] input: &str,
        #[case] minutes: usize,
        #[case] hours: usize,
        #[case] days_of_month: usize,
        #[case] months: usize,
        #[case] days_of_week: usize,
    ) {
        let expression = CronExpression::new(input).unwrap();
        let table = expression.table().to_string();
        let rows = table.lines().collect::<Vec<_>>();

        assert_eq!(rows.len(), 6);
        for (row, expected) in rows.iter().zip([minutes, hours, days_of_month, months, days_of_week]) {
            assert_eq!(row[LABEL_WIDTH..].split(' ').count(), expected, "row = {row}");
        }
        assert_eq!(rows[5], "command       ");
    }
}
