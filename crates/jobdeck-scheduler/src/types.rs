use std::{fmt, future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use futures_util::future::BoxFuture;

/// Wall-clock time of day (UTC) at which a daily or weekly job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AtTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl AtTime {
    pub fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// `None` when any component is out of range (e.g. hour 24).
    pub fn to_naive(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, self.second)
    }
}

impl fmt::Display for AtTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Defines when and how often a job should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDefinition {
    /// Run repeatedly with a fixed interval. First run is one interval after scheduling.
    Duration { every: Duration },

    /// Run repeatedly, waiting a random delay in `[min, max]` before each run.
    DurationRandom { min: Duration, max: Duration },

    /// Run according to a cron expression: five Unix fields, or six when
    /// `with_seconds` is set (leading seconds field). `@hourly`-style
    /// shorthands are accepted as-is.
    Cron { expression: String, with_seconds: bool },

    /// Run every `interval` days at each of `at_times` (UTC).
    Daily { interval: u32, at_times: Vec<AtTime> },

    /// Run every `interval` weeks on each of `weekdays` at each of `at_times` (UTC).
    Weekly {
        interval: u32,
        weekdays: Vec<Weekday>,
        at_times: Vec<AtTime>,
    },

    /// Run exactly once at the given UTC instant.
    OneTime { at: DateTime<Utc> },
}

impl JobDefinition {
    pub fn duration(every: Duration) -> Self {
        Self::Duration { every }
    }

    pub fn duration_random(min: Duration, max: Duration) -> Self {
        Self::DurationRandom { min, max }
    }

    pub fn cron(expression: impl Into<String>, with_seconds: bool) -> Self {
        Self::Cron {
            expression: expression.into(),
            with_seconds,
        }
    }

    pub fn daily(interval: u32, at_times: Vec<AtTime>) -> Self {
        Self::Daily { interval, at_times }
    }

    pub fn weekly(interval: u32, weekdays: Vec<Weekday>, at_times: Vec<AtTime>) -> Self {
        Self::Weekly {
            interval,
            weekdays,
            at_times,
        }
    }

    pub fn one_time(at: DateTime<Utc>) -> Self {
        Self::OneTime { at }
    }
}

/// Metadata and execution policy attached to a job at creation.
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    pub name: String,
    pub tags: Vec<String>,
    /// Skip a due run while the previous run of this job is still executing.
    pub singleton: bool,
    /// Remove the job from the scheduler after this many runs.
    pub limited_runs: Option<u32>,
}

impl JobOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    pub fn limited_runs(mut self, runs: u32) -> Self {
        self.limited_runs = Some(runs);
        self
    }
}

type TaskFn = dyn Fn() -> BoxFuture<'static, ()> + Send + Sync;

/// Executable job body. Opaque to everything except the engine that runs it.
#[derive(Clone)]
pub struct Task(Arc<TaskFn>);

impl Task {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self(Arc::new(move || -> BoxFuture<'static, ()> { Box::pin(f()) }))
    }

    /// Produce the future for one execution.
    pub fn run(&self) -> BoxFuture<'static, ()> {
        (self.0)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Task(..)")
    }
}
