use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;

/// Read-mostly view of one job held by a [`Scheduler`](crate::Scheduler).
///
/// Every getter reflects the job's state at the moment of the call; two
/// calls in a row may disagree if the job fires in between.
pub trait ScheduledJob: Send + Sync {
    fn id(&self) -> Uuid;

    fn name(&self) -> String;

    fn tags(&self) -> Vec<String>;

    /// Start time of the most recent run, if the job has run.
    fn last_run(&self) -> Option<DateTime<Utc>>;

    /// Next planned run, `None` while the scheduler is stopped or the job is exhausted.
    fn next_run(&self) -> Option<DateTime<Utc>>;

    /// Up to `count` planned runs, soonest first. The first entry equals
    /// [`next_run`](Self::next_run) when one is planned.
    fn next_runs(&self, count: usize) -> Vec<DateTime<Utc>>;

    /// Fire the job immediately, outside its schedule.
    fn run_now(&self) -> Result<()>;
}
