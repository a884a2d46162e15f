use crate::{
    expression::CronExpression,
    field::FieldValue,
    series::ValueSet,
    timer::ScheduleTimer,
    utils::{ceil_to_minute, first_day_of_next_month, floor_to_minute, start_of_next_day, start_of_next_hour},
};
use chrono::{DateTime, Datelike, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc};
use tracing::debug;

/// Every combination of month, day of month and day of week repeats within this period
/// (the Gregorian calendar cycle), so a search beyond it can't find anything new.
pub const SEARCH_HORIZON_YEARS: i32 = 400;

/// Cron expression bound to a timezone.
///
/// All queries are pure functions of their input timestamp,
/// so a single instance may be shared between threads without any coordination.
///
/// For the meaning of the expression fields, please refer to the [crate documentation](crate).
#[derive(Debug, Clone)]
pub struct Schedule<Tz: TimeZone = Utc> {
    tz: Tz,
    expression: CronExpression,
    matcher: Matcher,
}

impl Schedule<Utc> {
    /// Constructs a schedule which evaluates the `expression` in UTC.
    pub fn utc(expression: CronExpression) -> Self {
        Self::new(Utc, expression)
    }
}

#[cfg(feature = "tz")]
impl Schedule<chrono_tz::Tz> {
    /// Constructs a schedule in the IANA timezone `name`, like `Europe/Kyiv`.
    ///
    /// Returns [`CronError::InvalidTimeZone`](crate::CronError::InvalidTimeZone) if the name is unknown.
    pub fn in_timezone(name: &str, expression: CronExpression) -> crate::Result<Self> {
        let tz = name
            .parse::<chrono_tz::Tz>()
            .map_err(|_| crate::CronError::InvalidTimeZone(name.to_owned()))?;
        Ok(Self::new(tz, expression))
    }
}

impl<Tz: TimeZone> Schedule<Tz> {
    /// Constructs a schedule which evaluates the `expression` in the timezone `tz`.
    pub fn new(tz: Tz, expression: CronExpression) -> Self {
        let matcher = Matcher::from(&expression);
        Self {
            tz,
            expression,
            matcher,
        }
    }

    /// Timezone of the schedule.
    #[inline]
    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Underlying cron expression.
    #[inline]
    pub fn expression(&self) -> &CronExpression {
        &self.expression
    }

    /// Returns the next occurrence starting from the current wall-clock time (inclusively).
    #[inline]
    pub fn next(&self) -> Option<DateTime<Tz>> {
        self.next_from(&Utc::now())
    }

    /// Returns the first occurrence which is equal to or later than `current`.
    ///
    /// If `current` isn't at the start of a minute, the search starts at the next whole minute.
    /// Returns `None` if the expression never fires (like `* * 30 2 *`).
    #[inline]
    pub fn next_from<T: TimeZone>(&self, current: &DateTime<T>) -> Option<DateTime<Tz>> {
        self.upcoming(current, true)
    }

    /// Returns the first occurrence which is strictly later than `current`.
    #[inline]
    pub fn next_after<T: TimeZone>(&self, current: &DateTime<T>) -> Option<DateTime<Tz>> {
        self.upcoming(current, false)
    }

    /// Returns up to `n` next occurrences starting from the current wall-clock time.
    #[inline]
    pub fn project(&self, n: usize) -> Vec<DateTime<Tz>> {
        self.project_from(&Utc::now(), n)
    }

    /// Returns up to `n` strictly increasing occurrences,
    /// the first one may be equal to `current` if it matches the expression.
    ///
    /// The result is shorter than `n` only if the expression stops firing.
    pub fn project_from<T: TimeZone>(&self, current: &DateTime<T>, n: usize) -> Vec<DateTime<Tz>> {
        let mut result: Vec<DateTime<Tz>> = Vec::with_capacity(n);

        while result.len() < n {
            let next = match result.last() {
                None => self.next_from(current),
                Some(last) => self.next_after(last),
            };

            match next {
                Some(next) => result.push(next),
                None => break,
            }
        }

        result
    }

    /// Returns an iterator of occurrences starting from `current` (inclusively).
    #[inline]
    pub fn iter<T: TimeZone>(&self, current: &DateTime<T>) -> ScheduleIterator<Tz> {
        self.clone().into_iter(current)
    }

    /// Consumes the [`Schedule`] and returns an iterator of occurrences starting from `current` (inclusively).
    #[inline]
    pub fn into_iter<T: TimeZone>(self, current: &DateTime<T>) -> ScheduleIterator<Tz> {
        let next = self.next_from(current);
        ScheduleIterator { schedule: self, next }
    }

    /// Returns `true` if minute, hour, day of month, month and day of week of `time`,
    /// taken in the schedule's timezone, all match the expression. Seconds are ignored.
    pub fn matches<T: TimeZone>(&self, time: &DateTime<T>) -> bool {
        self.matcher.matches(&time.with_timezone(&self.tz).naive_local())
    }

    /// Returns a [`ScheduleTimer`] which fires on this schedule.
    #[inline]
    pub fn timer(&self) -> ScheduleTimer<Tz> {
        ScheduleTimer::new(self.clone())
    }

    /// Computes the next occurrence to fire at, `now` is the current wall-clock time,
    /// `last` is the previously fired occurrence, it's never returned again.
    pub(crate) fn next_firing(&self, now: &DateTime<Utc>, last: Option<&DateTime<Tz>>) -> Option<DateTime<Tz>> {
        let next = self.next_from(now)?;
        match last {
            Some(last) if next <= *last => self.next_after(last),
            _ => Some(next),
        }
    }

    /// Searches for the first occurrence starting from `current`, which is
    /// - equal to or later than `current` if `inclusive` is `true`;
    /// - strictly later than `current` otherwise.
    fn upcoming<T: TimeZone>(&self, current: &DateTime<T>, inclusive: bool) -> Option<DateTime<Tz>> {
        let reference = current.naive_utc();
        let is_acceptable = |candidate: &DateTime<Tz>| {
            if inclusive {
                candidate.naive_utc() >= reference
            } else {
                candidate.naive_utc() > reference
            }
        };

        let local = current.with_timezone(&self.tz).naive_local();
        let mut start = if inclusive {
            ceil_to_minute(local)?
        } else {
            floor_to_minute(local)?.checked_add_signed(TimeDelta::minutes(1))?
        };

        loop {
            let Some(found) = self.matcher.upcoming(start) else {
                debug!(expression = %self.expression, %start, "no occurrence within the search horizon");
                return None;
            };

            match self.tz.from_local_datetime(&found) {
                LocalResult::Single(candidate) if is_acceptable(&candidate) => return Some(candidate),
                LocalResult::Ambiguous(earliest, latest) => {
                    if is_acceptable(&earliest) {
                        return Some(earliest);
                    } else if is_acceptable(&latest) {
                        return Some(latest);
                    }
                }
                LocalResult::None => {
                    debug!(expression = %self.expression, local = %found, "local time doesn't exist in the timezone, skipped");
                }
                LocalResult::Single(_) => {}
            }

            start = found.checked_add_signed(TimeDelta::minutes(1))?;
        }
    }
}

/// Iterator of schedule occurrences, see [`Schedule::iter()`].
#[derive(Debug, Clone)]
pub struct ScheduleIterator<Tz: TimeZone> {
    schedule: Schedule<Tz>,
    next: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> Iterator for ScheduleIterator<Tz> {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.schedule.next_after(&current);
        Some(current)
    }
}

/// Enumerated values of all fields with the calendar search over local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Matcher {
    minutes: ValueSet,
    hours: ValueSet,
    days_of_month: ValueSet,
    months: ValueSet,
    days_of_week: ValueSet,
}

impl From<&CronExpression> for Matcher {
    fn from(expression: &CronExpression) -> Self {
        Self {
            minutes: expression.minutes().into(),
            hours: expression.hours().into(),
            days_of_month: expression.days_of_month().into(),
            months: expression.months().into(),
            days_of_week: expression.days_of_week().into(),
        }
    }
}

impl Matcher {
    fn matches(&self, time: &NaiveDateTime) -> bool {
        self.months.contains(time.month() as FieldValue)
            && self.matches_day(time)
            && self.hours.contains(time.hour() as FieldValue)
            && self.minutes.contains(time.minute() as FieldValue)
    }

    /// Both day of month and day of week must match.
    #[inline]
    fn matches_day(&self, time: &NaiveDateTime) -> bool {
        // chrono numbers weekdays from Monday as 1 to Sunday as 7, exactly as the field does
        self.days_of_month.contains(time.day() as FieldValue)
            && self
                .days_of_week
                .contains(time.weekday().number_from_monday() as FieldValue)
    }

    /// Returns the first matching minute equal to or later than `start`, which has to be at a minute start.
    ///
    /// Whenever a coarser unit is advanced, all finer units restart from their first value,
    /// so wrapping into a new month always re-verifies the month.
    fn upcoming(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        let horizon = start.year().checked_add(SEARCH_HORIZON_YEARS)?;
        let mut current = start;

        while current.year() <= horizon {
            let date = current.date();

            if !self.months.contains(date.month() as FieldValue) {
                current = first_day_of_next_month(date)?;
                continue;
            }

            if !self.matches_day(&current) {
                current = start_of_next_day(date)?;
                continue;
            }

            let Some(hour) = self.hours.ceiling(current.hour() as FieldValue) else {
                current = start_of_next_day(date)?;
                continue;
            };
            if hour as u32 != current.hour() {
                current = date.and_hms_opt(hour as u32, 0, 0)?;
            }

            let Some(minute) = self.minutes.ceiling(current.minute() as FieldValue) else {
                current = start_of_next_hour(current)?;
                continue;
            };

            return current.with_minute(minute as u32);
        }

        None
    }
}
