use std::sync::Arc;

use async_trait::async_trait;
use jobdeck_protocol::{
    time::{format_time, format_times},
    JobSnapshot,
};
use jobdeck_scheduler::{ScheduledJob, Scheduler};

use crate::describe::describe;

/// Anything that can produce the current job list for the live view.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self) -> Vec<JobSnapshot>;
}

/// Projects scheduler jobs into wire snapshots.
#[derive(Clone)]
pub struct SnapshotBuilder {
    scheduler: Arc<dyn Scheduler>,
    next_runs: usize,
}

impl SnapshotBuilder {
    pub fn new(scheduler: Arc<dyn Scheduler>, next_runs: usize) -> Self {
        Self {
            scheduler,
            next_runs,
        }
    }

    pub fn project(&self, job: &dyn ScheduledJob) -> JobSnapshot {
        let name = job.name();
        let next_runs = job.next_runs(self.next_runs);
        let (schedule, schedule_detail) = describe(&name, &next_runs);

        JobSnapshot {
            id: job.id().to_string(),
            name,
            tags: job.tags(),
            next_run: format_time(job.next_run()),
            last_run: format_time(job.last_run()),
            next_runs: format_times(&next_runs),
            schedule,
            schedule_detail,
        }
    }
}

#[async_trait]
impl SnapshotSource for SnapshotBuilder {
    async fn snapshot(&self) -> Vec<JobSnapshot> {
        self.scheduler
            .jobs()
            .await
            .iter()
            .map(|job| self.project(job.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdeck_protocol::time::parse_time;
    use jobdeck_scheduler::{JobDefinition, JobOptions, LocalScheduler, Task};
    use std::time::Duration;

    #[tokio::test]
    async fn snapshots_follow_scheduler_order_and_format() {
        let scheduler = Arc::new(LocalScheduler::new());
        scheduler.start().await.unwrap();
        for (name, secs) in [("first", 10), ("second", 30)] {
            scheduler
                .new_job(
                    JobDefinition::duration(Duration::from_secs(secs)),
                    Task::new(|| async {}),
                    JobOptions::named(name).with_tags(["demo"]),
                )
                .await
                .unwrap();
        }

        let builder = SnapshotBuilder::new(scheduler.clone(), 5);
        let jobs = builder.snapshot().await;

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "first");
        assert_eq!(jobs[0].schedule, "Every 10 seconds");
        assert_eq!(jobs[1].schedule_detail, "Duration: 30s");
        assert_eq!(jobs[0].tags, vec!["demo".to_string()]);
        assert_eq!(jobs[0].last_run, "");

        for job in &jobs {
            assert_eq!(job.next_runs.len(), 5);
            assert_eq!(job.next_runs[0], job.next_run);
            assert!(parse_time(&job.next_run).unwrap().is_some());
            assert!(job.next_runs.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[tokio::test]
    async fn stopped_scheduler_has_empty_next_run() {
        let scheduler = Arc::new(LocalScheduler::new());
        scheduler
            .new_job(
                JobDefinition::duration(Duration::from_secs(10)),
                Task::new(|| async {}),
                JobOptions::named("idle"),
            )
            .await
            .unwrap();

        let jobs = SnapshotBuilder::new(scheduler, 5).snapshot().await;
        assert_eq!(jobs[0].next_run, "");
        assert!(jobs[0].next_runs.is_empty());
        assert_eq!(jobs[0].schedule, "Scheduled");
    }
}
