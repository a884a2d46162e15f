use chrono::DateTime;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cron_forecast::{CronExpression, Schedule};

const EXPRESSIONS: &[&str] = &[
    "* * * * *",
    "*/10 * * * *",
    "00 09-18 * * 1-5",
    "10/5 3-5 1,2 7 2",
    "0 0 29 2 1",
];

const NOW: &[&str] = &["1999-12-31T23:59:59Z", "2000-01-01T00:00:00Z", "2099-12-31T23:59:59Z"];
const TAKE_SAMPLES: usize = 1_000;

#[cfg(feature = "tz")]
const TIME_ZONES: &[&str] = &["UTC", "EET", "Europe/Kyiv"];

pub fn parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for expression in EXPRESSIONS {
        group.bench_with_input(BenchmarkId::from_parameter(expression), expression, |b, e| {
            b.iter(|| CronExpression::new(*e).unwrap())
        });
    }
    group.finish();
}

pub fn next_from_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_from");
    for expression in EXPRESSIONS {
        for now_str in NOW {
            let now = DateTime::parse_from_rfc3339(now_str).unwrap();
            let schedule = Schedule::utc(CronExpression::new(*expression).unwrap());
            group.bench_with_input(
                BenchmarkId::from_parameter(format!("{now_str}/{expression}")),
                &(now, &schedule),
                |b, (now, schedule)| b.iter(|| schedule.next_from(now)),
            );

            #[cfg(feature = "tz")]
            for tz in TIME_ZONES {
                let schedule = Schedule::in_timezone(tz, CronExpression::new(*expression).unwrap()).unwrap();
                group.bench_with_input(
                    BenchmarkId::from_parameter(format!("{now_str}/{tz}/{expression}")),
                    &(now, &schedule),
                    |b, (now, schedule)| b.iter(|| schedule.next_from(now)),
                );
            }
        }
    }
    group.finish();
}

pub fn project_from_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_from");
    for expression in EXPRESSIONS {
        for now_str in NOW {
            let now = DateTime::parse_from_rfc3339(now_str).unwrap();
            let schedule = Schedule::utc(CronExpression::new(*expression).unwrap());
            group.bench_with_input(
                BenchmarkId::from_parameter(format!("{now_str}/{expression}")),
                &(now, &schedule),
                |b, (now, schedule)| b.iter(|| schedule.project_from(now, TAKE_SAMPLES).len()),
            );

            #[cfg(feature = "tz")]
            for tz in TIME_ZONES {
                let schedule = Schedule::in_timezone(tz, CronExpression::new(*expression).unwrap()).unwrap();
                group.bench_with_input(
                    BenchmarkId::from_parameter(format!("{now_str}/{tz}/{expression}")),
                    &(now, &schedule),
                    |b, (now, schedule)| b.iter(|| schedule.project_from(now, TAKE_SAMPLES).len()),
                );
            }
        }
    }
    group.finish();
}

criterion_group!(benches, parse_benchmark, next_from_benchmark, project_from_benchmark);
criterion_main!(benches);
