//! Sample job set seeded on startup so the dashboard has something to show.

use std::time::Duration;

use chrono::{Utc, Weekday};
use jobdeck_scheduler::{AtTime, JobDefinition, JobOptions, Scheduler, Task};
use rand::Rng;
use tracing::{info, warn};

fn logging(line: &'static str) -> Task {
    Task::new(move || async move {
        info!("{line}");
    })
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Register the demo jobs. A job the scheduler rejects is logged and
/// skipped. Returns how many were added.
pub async fn seed(scheduler: &dyn Scheduler) -> usize {
    let jobs: Vec<(JobDefinition, Task, JobOptions)> = vec![
        (
            JobDefinition::duration(secs(10)),
            logging("running 10-second interval job"),
            JobOptions::named("simple-10s-interval").with_tags(["interval", "simple"]),
        ),
        (
            JobDefinition::duration(secs(5)),
            logging("fast 5-second job executed"),
            JobOptions::named("fast-5s-job").with_tags(["interval", "fast"]),
        ),
        (
            JobDefinition::cron("* * * * *", false),
            logging("cron job executed (every minute)"),
            JobOptions::named("cron-every-minute").with_tags(["cron", "periodic"]),
        ),
        (
            JobDefinition::daily(1, vec![AtTime::new(14, 30, 0)]),
            logging("daily job executed at 14:30"),
            JobOptions::named("daily-afternoon-report").with_tags(["daily", "report"]),
        ),
        (
            JobDefinition::weekly(
                1,
                vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
                vec![AtTime::new(9, 0, 0)],
            ),
            logging("weekly job executed (Mon, Wed, Fri at 09:00)"),
            JobOptions::named("weekly-mwf-morning").with_tags(["weekly", "morning", "report"]),
        ),
        (
            JobDefinition::duration(secs(12)),
            parameterized("example-job", 42),
            JobOptions::named("parameterized-job").with_tags(["parameters", "demo"]),
        ),
        (
            JobDefinition::duration(secs(8)),
            logging("context-aware job executed"),
            JobOptions::named("context-aware-job").with_tags(["context", "advanced"]),
        ),
        (
            JobDefinition::duration_random(secs(5), secs(15)),
            logging("random interval job executed (5-15 seconds)"),
            JobOptions::named("random-interval-job").with_tags(["random", "variable"]),
        ),
        (
            JobDefinition::duration(secs(5)),
            long_running(),
            JobOptions::named("singleton-mode-job")
                .with_tags(["singleton", "long-running"])
                .singleton(),
        ),
        (
            JobDefinition::duration(secs(7)),
            logging("limited run job executed"),
            JobOptions::named("limited-run-job")
                .with_tags(["limited", "demo"])
                .limited_runs(3),
        ),
        (
            JobDefinition::duration(secs(15)),
            with_listeners("event-listener-job"),
            JobOptions::named("event-listener-job").with_tags(["events", "monitoring"]),
        ),
        (
            JobDefinition::one_time(Utc::now() + chrono::Duration::seconds(30)),
            logging("one-time job executed"),
            JobOptions::named("one-time-job").with_tags(["onetime", "scheduled"]),
        ),
        (
            JobDefinition::duration(secs(20)),
            data_processor(),
            JobOptions::named("data-processor-job").with_tags(["processing", "batch"]),
        ),
        (
            JobDefinition::duration(secs(30)),
            health_check(),
            JobOptions::named("health-check-job").with_tags(["monitoring", "health"]),
        ),
    ];

    let mut added = 0;
    for (definition, task, options) in jobs {
        let name = options.name.clone();
        match scheduler.new_job(definition, task, options).await {
            Ok(_) => added += 1,
            Err(e) => warn!(name = %name, error = %e, "failed to add demo job"),
        }
    }
    info!(added, "demo jobs seeded");
    added
}

fn parameterized(name: &'static str, count: u32) -> Task {
    Task::new(move || async move {
        info!(name, count, "job with parameters executed");
    })
}

fn long_running() -> Task {
    Task::new(|| async {
        info!("singleton job started");
        tokio::time::sleep(secs(8)).await;
        info!("singleton job completed");
    })
}

fn with_listeners(job: &'static str) -> Task {
    Task::new(move || async move {
        info!(job, "before job runs");
        let work = rand::thread_rng().gen_range(1..=3);
        tokio::time::sleep(secs(work)).await;
        info!(job, "after job runs");
    })
}

fn data_processor() -> Task {
    Task::new(|| async {
        let items: u32 = rand::thread_rng().gen_range(1..=100);
        info!(items, "processing items");
        tokio::time::sleep(secs(2)).await;
        info!(items, "items processed");
    })
}

fn health_check() -> Task {
    Task::new(|| async {
        let status = if rand::thread_rng().gen::<f32>() < 0.1 {
            "degraded"
        } else {
            "healthy"
        };
        info!(status, "health check");
    })
}
