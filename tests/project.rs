use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use cron_forecast::{CronExpression, Result, Schedule};

#[test]
fn project() -> Result<()> {
    let schedule = Schedule::utc(CronExpression::new("*/10 * * * *")?);
    let now = Utc::now();

    // Get the next 10 occurrences starting from now
    let next = schedule.project_from(&now, 10);
    next.iter().for_each(|t| println!("next: {t}"));

    assert_eq!(next.len(), 10);
    assert!(next.windows(2).all(|w| w[1] - w[0] == TimeDelta::minutes(10)));

    Ok(())
}

#[test]
fn iterator_in_timezone() -> Result<()> {
    let tz = FixedOffset::west_opt(3 * 3600).unwrap();
    let schedule = Schedule::new(tz, "30 23 * * 7 weekly-report".parse()?);
    let start = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();

    let next = schedule.iter(&start).take(3).map(|t| t.to_rfc3339()).collect::<Vec<_>>();
    assert_eq!(
        next,
        vec![
            // it's still Sunday in UTC-3
            "2023-12-31T23:30:00-03:00",
            "2024-01-07T23:30:00-03:00",
            "2024-01-14T23:30:00-03:00",
        ]
    );
    assert_eq!(schedule.expression().command(), "weekly-report");

    Ok(())
}

#[test]
fn table() -> Result<()> {
    let expression = CronExpression::new("*/15 0 1,15 * 1-5 /usr/bin/find")?;
    println!("{}", expression.table());

    assert_eq!(expression.table().to_string().lines().count(), 6);

    Ok(())
}
