use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use rand::Rng;

use crate::{
    error::{Result, SchedulerError},
    types::{AtTime, JobDefinition},
};

/// A [`JobDefinition`] validated and pre-parsed for repeated evaluation.
#[derive(Debug, Clone)]
pub enum Schedule {
    Interval {
        every: Duration,
    },
    RandomInterval {
        min: Duration,
        max: Duration,
    },
    Cron(Box<cron::Schedule>),
    Daily {
        interval: u32,
        at_times: Vec<NaiveTime>,
    },
    Weekly {
        interval: u32,
        weekdays: Vec<Weekday>,
        at_times: Vec<NaiveTime>,
    },
    Once {
        at: DateTime<Utc>,
    },
}

impl Schedule {
    /// Validate `definition` and compile it. Every rejection is an
    /// [`SchedulerError::InvalidSchedule`] carrying a readable reason.
    pub fn compile(definition: &JobDefinition) -> Result<Self> {
        match definition {
            JobDefinition::Duration { every } => {
                let every = positive(*every, "duration")?;
                Ok(Schedule::Interval { every })
            }

            JobDefinition::DurationRandom { min, max } => {
                if min > max {
                    return Err(invalid("random duration minimum exceeds maximum"));
                }
                let min = positive(*min, "random duration minimum")?;
                let max = positive(*max, "random duration maximum")?;
                Ok(Schedule::RandomInterval { min, max })
            }

            JobDefinition::Cron {
                expression,
                with_seconds,
            } => {
                let expr = to_cron_crate_format(expression, *with_seconds)?;
                let parsed = cron::Schedule::from_str(&expr)
                    .map_err(|e| invalid(format!("cron expression {expression:?}: {e}")))?;
                Ok(Schedule::Cron(Box::new(parsed)))
            }

            JobDefinition::Daily { interval, at_times } => {
                if *interval == 0 {
                    return Err(invalid("daily interval must be positive"));
                }
                Ok(Schedule::Daily {
                    interval: *interval,
                    at_times: compile_times(at_times)?,
                })
            }

            JobDefinition::Weekly {
                interval,
                weekdays,
                at_times,
            } => {
                if *interval == 0 {
                    return Err(invalid("weekly interval must be positive"));
                }
                if weekdays.is_empty() {
                    return Err(invalid("weekly job needs at least one weekday"));
                }
                let mut weekdays = weekdays.clone();
                weekdays.sort_by_key(|d| d.num_days_from_monday());
                weekdays.dedup();
                Ok(Schedule::Weekly {
                    interval: *interval,
                    weekdays,
                    at_times: compile_times(at_times)?,
                })
            }

            JobDefinition::OneTime { at } => Ok(Schedule::Once { at: *at }),
        }
    }

    /// True when upcoming runs beyond the next one cannot be known in advance.
    pub fn is_unpredictable(&self) -> bool {
        matches!(self, Schedule::RandomInterval { .. })
    }
}

/// Compute the next UTC execution time for `schedule` strictly *after* `from`.
///
/// Returns `None` when the schedule is exhausted (a `Once` job whose instant
/// is not in the future, or a cron expression with no further match).
pub fn compute_next_run(schedule: &Schedule, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match schedule {
        Schedule::Interval { every } => from.checked_add_signed(*every),

        Schedule::RandomInterval { min, max } => {
            let lo = min.num_milliseconds();
            let hi = max.num_milliseconds();
            let delay = rand::thread_rng().gen_range(lo..=hi);
            from.checked_add_signed(Duration::milliseconds(delay))
        }

        Schedule::Cron(cron) => cron.after(&from).next(),

        Schedule::Daily { interval, at_times } => {
            let today = from.date_naive();
            if let Some(candidate) = first_slot_after(today, at_times, from) {
                return Some(candidate);
            }
            // Today's slots have passed; jump `interval` days ahead.
            let day = today.checked_add_days(Days::new(u64::from(*interval)))?;
            at_times.first().map(|t| day.and_time(*t).and_utc())
        }

        Schedule::Weekly {
            interval,
            weekdays,
            at_times,
        } => {
            let today = from.date_naive();
            let offset = u64::from(today.weekday().num_days_from_monday());
            let week_start = today.checked_sub_days(Days::new(offset))?;

            // Remaining days of the current week.
            for day in week_days(week_start, weekdays) {
                if day < today {
                    continue;
                }
                if let Some(candidate) = first_slot_after(day, at_times, from) {
                    return Some(candidate);
                }
            }

            // Current week exhausted: first slot of the week `interval` weeks on.
            let next_week = week_start.checked_add_days(Days::new(7 * u64::from(*interval)))?;
            let day = week_days(next_week, weekdays).next()?;
            at_times.first().map(|t| day.and_time(*t).and_utc())
        }

        Schedule::Once { at } => {
            // Fire only if the instant is still in the future.
            if *at > from {
                Some(*at)
            } else {
                None
            }
        }
    }
}

/// Project up to `count` runs starting at `first` (itself included).
///
/// Random-interval and one-time schedules only ever know their next run.
pub fn upcoming_runs(
    schedule: &Schedule,
    first: Option<DateTime<Utc>>,
    count: usize,
) -> Vec<DateTime<Utc>> {
    let Some(first) = first else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }
    if schedule.is_unpredictable() || matches!(schedule, Schedule::Once { .. }) {
        return vec![first];
    }

    let mut runs = Vec::with_capacity(count);
    runs.push(first);
    let mut cursor = first;
    while runs.len() < count {
        match compute_next_run(schedule, cursor) {
            Some(next) => {
                runs.push(next);
                cursor = next;
            }
            None => break,
        }
    }
    runs
}

// --- private helpers -------------------------------------------------------

fn invalid(reason: impl Into<String>) -> SchedulerError {
    SchedulerError::InvalidSchedule(reason.into())
}

fn positive(d: std::time::Duration, what: &str) -> Result<Duration> {
    if d.is_zero() {
        return Err(invalid(format!("{what} must be positive")));
    }
    Duration::from_std(d).map_err(|_| invalid(format!("{what} is too large")))
}

fn compile_times(at_times: &[AtTime]) -> Result<Vec<NaiveTime>> {
    if at_times.is_empty() {
        return Err(invalid("at least one time of day is required"));
    }
    let mut times = at_times
        .iter()
        .map(|t| {
            t.to_naive()
                .ok_or_else(|| invalid(format!("time of day out of range: {t}")))
        })
        .collect::<Result<Vec<_>>>()?;
    times.sort();
    times.dedup();
    Ok(times)
}

/// Convert a Unix cron expression to the 6/7-field format of the `cron` crate.
///
/// 5-field: minute hour day-of-month month day-of-week
/// 7-field: second minute hour day-of-month month day-of-week year
///
/// The day-of-week field is rewritten into day names: Unix counts 0-7 from
/// Sunday (7 is Sunday again) while the crate counts 1-7 from Sunday.
fn to_cron_crate_format(expression: &str, with_seconds: bool) -> Result<String> {
    let trimmed = expression.trim();
    if trimmed.starts_with('@') {
        return Ok(trimmed.to_string());
    }
    let mut fields: Vec<String> = trimmed.split_whitespace().map(String::from).collect();
    let expected = if with_seconds { 6 } else { 5 };
    if fields.len() != expected {
        return Err(invalid(format!(
            "cron expression {expression:?} has {} fields, expected {expected}",
            fields.len()
        )));
    }

    let dow = expected - 1;
    fields[dow] = unix_weekdays(&fields[dow])
        .map_err(|reason| invalid(format!("cron expression {expression:?}: {reason}")))?;
    let joined = fields.join(" ");

    Ok(if with_seconds {
        format!("{joined} *")
    } else {
        format!("0 {joined} *")
    })
}

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Rewrite a Unix day-of-week field (`1-5`, `0,6`, `*/2`, `5-7`) into a
/// list of day names. Parts that are already names pass through untouched.
fn unix_weekdays(field: &str) -> std::result::Result<String, String> {
    if field == "*" || field == "?" {
        return Ok(field.to_string());
    }

    let mut parts: Vec<String> = Vec::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: usize = step
                    .parse()
                    .map_err(|_| format!("invalid day-of-week step {step:?}"))?;
                if step == 0 {
                    return Err("day-of-week step must be positive".to_string());
                }
                (range, Some(step))
            }
            None => (part, None),
        };

        let bounds = match range.split_once('-') {
            _ if range == "*" => Some((0, 6)),
            Some((lo, hi)) => match (day_number(lo)?, day_number(hi)?) {
                (Some(lo), Some(hi)) => Some((lo, hi)),
                (None, None) => None,
                _ => return Err(format!("mixed day-of-week range {range:?}")),
            },
            // `n/step` runs from n to the end of the week
            None => day_number(range)?.map(|n| (n, if step.is_some() { 6 } else { n })),
        };

        match bounds {
            Some((lo, hi)) => {
                if lo > hi {
                    return Err(format!("day-of-week range {range:?} is reversed"));
                }
                for n in (lo..=hi).step_by(step.unwrap_or(1)) {
                    let name = DAY_NAMES[n % 7].to_string();
                    if !parts.contains(&name) {
                        parts.push(name);
                    }
                }
            }
            None => parts.push(part.to_string()),
        }
    }
    Ok(parts.join(","))
}

/// `Some(0..=7)` for a numeric day, `None` for a name.
fn day_number(raw: &str) -> std::result::Result<Option<usize>, String> {
    if !raw.chars().all(|c| c.is_ascii_digit()) || raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<usize>() {
        Ok(n) if n <= 7 => Ok(Some(n)),
        _ => Err(format!("day-of-week {raw:?} out of range 0-7")),
    }
}

fn first_slot_after(
    day: NaiveDate,
    at_times: &[NaiveTime],
    from: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    at_times
        .iter()
        .map(|t| day.and_time(*t).and_utc())
        .find(|candidate| *candidate > from)
}

/// Days of the week starting at `week_start` (a Monday) whose weekday is selected.
fn week_days(week_start: NaiveDate, weekdays: &[Weekday]) -> impl Iterator<Item = NaiveDate> + '_ {
    weekdays.iter().filter_map(move |d| {
        week_start.checked_add_days(Days::new(u64::from(d.num_days_from_monday())))
    })
}
